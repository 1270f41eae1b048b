//! The output stage: collects compressed blocks from the workers, restores
//! block id order, and writes the single bzip2 stream.
//!
//! Workers finish out of order; the writer parks early arrivals in an
//! id-keyed map and only ever appends the next expected id. The combined
//! stream CRC folds in emission order, so it is computed here rather than
//! by the workers.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Condvar, Mutex};

use log::{debug, info};

use crate::bitstream::bitwriter::BitStreamWriter;
use crate::error::Result;
use crate::tools::crc;

/// End of stream marker: sqrt(pi), BCD coded.
const STREAM_FOOTER_MAGIC: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];

/// One compressed block, bit length exact.
pub struct CompressedBlock {
    /// `bits.div_ceil(8)` bytes of packed payload.
    pub payload: Vec<u8>,
    /// Exact payload length in bits.
    pub bits: u64,
    /// The block's pre-RLE source CRC.
    pub crc: u32,
}

struct ReorderState {
    /// Out-of-order completions, keyed by block id. Only holds ids that have
    /// not been emitted yet.
    completed: BTreeMap<u64, CompressedBlock>,
    /// Total block count, once the reader knows it.
    last_id: Option<u64>,
}

/// Shared handle between the workers (which submit) and the writer thread
/// (which drains in order).
pub struct OutputWriter {
    state: Mutex<ReorderState>,
    ready: Condvar,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReorderState {
                completed: BTreeMap::new(),
                last_id: None,
            }),
            ready: Condvar::new(),
        }
    }

    /// Submit a finished block. Never blocks; the number of parked blocks is
    /// bounded by the input pool size.
    pub fn add(&self, id: u64, block: CompressedBlock) {
        let mut state = self.state.lock().unwrap();
        state.completed.insert(id, block);
        self.ready.notify_one();
    }

    /// Publish the total block count so the drain loop knows when to stop.
    pub fn set_last_block(&self, last_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.last_id = Some(last_id);
        self.ready.notify_one();
    }

    /// Drain every block in id order, then write the stream trailer.
    /// Returns the output sink once it has been flushed.
    pub fn run<W: Write>(&self, mut out: BitStreamWriter<W>, block_size: usize) -> Result<W> {
        out.write(&[b'B', b'Z', b'h', b'0' + block_size as u8], 32)?;

        let mut next_id = 1_u64;
        let mut stream_crc = 0_u32;
        loop {
            let block = {
                let mut state = self.state.lock().unwrap();
                loop {
                    if state.last_id.is_some_and(|last| next_id > last) {
                        break None;
                    }
                    if let Some(block) = state.completed.remove(&next_id) {
                        break Some(block);
                    }
                    state = self.ready.wait(state).unwrap();
                }
            };
            let Some(block) = block else { break };

            out.write(&block.payload, block.bits)?;
            stream_crc = crc::combine(stream_crc, block.crc);
            debug!("block {} emitted, {} bits", next_id, block.bits);
            next_id += 1;
        }

        let mut trailer = [0_u8; 10];
        trailer[..6].copy_from_slice(&STREAM_FOOTER_MAGIC);
        trailer[6..].copy_from_slice(&stream_crc.to_be_bytes());
        out.write(&trailer, 80)?;

        info!("wrote {} blocks, stream crc {:08x}", next_id - 1, stream_crc);
        out.finish()
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn block(bits: u64, fill: u8, crc: u32) -> CompressedBlock {
        CompressedBlock {
            payload: vec![fill; bits.div_ceil(8) as usize],
            bits,
            crc,
        }
    }

    /// What the stream should look like for blocks written in id order.
    fn expected_stream(blocks: &[&CompressedBlock], block_size: usize) -> Vec<u8> {
        let mut out = BitStreamWriter::new(Vec::new(), 64);
        out.write(&[b'B', b'Z', b'h', b'0' + block_size as u8], 32)
            .unwrap();
        let mut stream_crc = 0_u32;
        for b in blocks {
            out.write(&b.payload, b.bits).unwrap();
            stream_crc = crc::combine(stream_crc, b.crc);
        }
        let mut trailer = STREAM_FOOTER_MAGIC.to_vec();
        trailer.extend_from_slice(&stream_crc.to_be_bytes());
        out.write(&trailer, 80).unwrap();
        out.finish().unwrap()
    }

    #[test]
    fn zero_blocks_is_header_plus_trailer() {
        let writer = OutputWriter::new();
        writer.set_last_block(0);
        let out = writer
            .run(BitStreamWriter::new(Vec::new(), 64), 1)
            .unwrap();
        assert_eq!(
            out,
            vec![b'B', b'Z', b'h', b'1', 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0, 0, 0, 0]
        );
        assert_eq!(out.len(), 14);
    }

    #[test]
    fn out_of_order_additions_emit_in_id_order() {
        let writer = OutputWriter::new();
        let (b1, b2, b3) = (block(8, 0xff, 1), block(13, 0xa5, 2), block(3, 0xe0, 3));
        let expect = expected_stream(&[&b1, &b2, &b3], 5);

        writer.add(3, block(3, 0xe0, 3));
        writer.add(1, block(8, 0xff, 1));
        writer.add(2, block(13, 0xa5, 2));
        writer.set_last_block(3);

        let out = writer.run(BitStreamWriter::new(Vec::new(), 64), 5).unwrap();
        assert_eq!(out, expect);
    }

    #[test]
    fn drain_waits_for_the_missing_id() {
        let writer = Arc::new(OutputWriter::new());
        let expect = expected_stream(&[&block(8, 0x11, 7), &block(8, 0x22, 8)], 9);

        writer.add(2, block(8, 0x22, 8));
        let run = {
            let writer = Arc::clone(&writer);
            thread::spawn(move || writer.run(BitStreamWriter::new(Vec::new(), 64), 9).unwrap())
        };
        // The writer cannot make progress until id 1 shows up.
        thread::sleep(Duration::from_millis(20));
        writer.add(1, block(8, 0x11, 7));
        writer.set_last_block(2);
        assert_eq!(run.join().unwrap(), expect);
    }

    #[test]
    fn crc_composition_is_order_sensitive() {
        let writer = OutputWriter::new();
        writer.add(1, block(8, 0, 0x8000_0001));
        writer.add(2, block(8, 0, 0x0000_0010));
        writer.set_last_block(2);
        let out = writer.run(BitStreamWriter::new(Vec::new(), 64), 1).unwrap();
        // rotl1(rotl1(0) ^ c1) ^ c2
        let expect = 0x8000_0001_u32.rotate_left(1) ^ 0x0000_0010;
        assert_eq!(&out[out.len() - 4..], &expect.to_be_bytes());
    }
}
