//! The middle stage: stateless workers that turn input blocks into
//! compressed payloads.

use log::trace;

use super::reader::BlockQueues;
use super::writer::{CompressedBlock, OutputWriter};
use crate::compression::compress_block::compress_block;

/// Pull blocks until the reader closes the busy queue. The input buffer is
/// copied out and returned to the pool *before* compressing, so the reader
/// can refill it while this block is still in flight.
pub fn worker_loop(queues: &BlockQueues, writer: &OutputWriter) {
    let mut scratch: Vec<u8> = Vec::new();
    while let Some(block) = queues.get() {
        scratch.clear();
        scratch.extend_from_slice(&block.data);
        let (id, crc) = (block.id, block.crc);
        queues.put(block);

        trace!("compressing block {}", id);
        let (payload, bits) = compress_block(&scratch, crc);
        writer.add(id, CompressedBlock { payload, bits, crc });
    }
}
