//! The input stage: a single-threaded producer that reads the source,
//! applies the RLE1 pre-pass, slices the result into blocks and feeds them
//! to the workers through a bounded pool.
//!
//! RLE1 encodes a run of `r` identical bytes `b` as the byte repeated
//! `min(r, 4)` times, followed by a count byte `r - 4` when `r >= 4`. Runs
//! split at length 259. The block CRC covers the original bytes, not the
//! RLE output, and a run tuple is never split across a block boundary: the
//! block closes early instead, so every block starts on an RLE boundary and
//! never overruns the block capacity.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::{Arc, Condvar, Mutex};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::tools::crc;

/// Input is pulled off the source in chunks of this size.
const INPUT_BUFFER_SIZE: usize = 1 << 20;

/// Longest encodable run: four literal bytes plus a 255 count.
const MAX_RUN: u32 = 259;

/// RLE state value meaning "no run in progress".
const NO_RUN: u16 = 256;

/// One block of post-RLE1 input. Exactly one owner at any time: the blocks
/// cycle free pool -> reader -> busy queue -> worker -> free pool, moving
/// through the queues by value.
pub struct InputBlock {
    /// Post-RLE1 bytes; capacity is the full block size.
    pub data: Vec<u8>,
    /// Finalized CRC of the pre-RLE source bytes behind `data`.
    pub crc: u32,
    /// Dense 1-based sequence number in input order.
    pub id: u64,
}

struct QueueState {
    free: Vec<InputBlock>,
    busy: VecDeque<InputBlock>,
    finished: bool,
}

/// The free pool and busy queue, guarded by one mutex with a condvar per
/// direction. The single lock lets a worker observe "busy queue empty AND
/// reader finished" atomically, so no worker can block past end of stream.
pub struct BlockQueues {
    state: Mutex<QueueState>,
    free_ready: Condvar,
    busy_ready: Condvar,
}

impl BlockQueues {
    /// Build a pool of `pool_size` blocks with `100_000 * block_size` bytes
    /// of capacity each.
    pub fn new(pool_size: usize, block_size: usize) -> Self {
        let free = (0..pool_size)
            .map(|_| InputBlock {
                data: Vec::with_capacity(block_size * 100_000),
                crc: 0,
                id: 0,
            })
            .collect();
        Self {
            state: Mutex::new(QueueState {
                free,
                busy: VecDeque::new(),
                finished: false,
            }),
            free_ready: Condvar::new(),
            busy_ready: Condvar::new(),
        }
    }

    /// Worker side: next filled block, blocking while the reader is still
    /// running. Returns None exactly when no more blocks will ever arrive.
    pub fn get(&self) -> Option<InputBlock> {
        let mut state = self.state.lock().unwrap();
        while state.busy.is_empty() && !state.finished {
            state = self.busy_ready.wait(state).unwrap();
        }
        state.busy.pop_front()
    }

    /// Worker side: return a consumed block to the free pool.
    pub fn put(&self, mut block: InputBlock) {
        block.data.clear();
        let mut state = self.state.lock().unwrap();
        state.free.push(block);
        self.free_ready.notify_one();
    }

    /// Reader side: take an empty block, blocking until a worker returns
    /// one. This is the pipeline's back-pressure.
    fn acquire_free(&self) -> InputBlock {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(block) = state.free.pop() {
                return block;
            }
            state = self.free_ready.wait(state).unwrap();
        }
    }

    /// Reader side: hand a filled block to the workers.
    fn dispatch(&self, block: InputBlock) {
        let mut state = self.state.lock().unwrap();
        state.busy.push_back(block);
        self.busy_ready.notify_one();
    }

    /// Reader side: no more blocks will be dispatched. Wakes every waiting
    /// worker so they can observe the end of stream.
    fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.finished = true;
        self.busy_ready.notify_all();
    }
}

/// Single-threaded producer. Owns the RLE1 state, which rolls across both
/// read chunks and block boundaries.
pub struct Reader<R> {
    input: R,
    queues: Arc<BlockQueues>,
    nblock_max: usize,
    block: Option<InputBlock>,
    block_crc: u32,
    blocks_produced: u64,
    rle_ch: u16,
    rle_len: u32,
}

impl<R: Read> Reader<R> {
    pub fn new(input: R, queues: Arc<BlockQueues>, block_size: usize) -> Self {
        Self {
            input,
            queues,
            nblock_max: block_size * 100_000 - 19,
            block: None,
            block_crc: crc::CRC_INIT,
            blocks_produced: 0,
            rle_ch: NO_RUN,
            rle_len: 0,
        }
    }

    /// Read the input to end, dispatching blocks as they fill. Closes the
    /// busy queue on every exit path and returns the total block count.
    pub fn run(mut self) -> Result<u64> {
        let mut buffer = vec![0_u8; INPUT_BUFFER_SIZE];
        loop {
            let count = match self.input.read(&mut buffer) {
                Ok(0) => break,
                Ok(count) => count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.queues.close();
                    return Err(Error::Read(e));
                }
            };
            for &byte in &buffer[..count] {
                self.rle_byte(byte);
            }
        }

        if self.rle_ch != NO_RUN && self.rle_len > 0 {
            self.put_run();
        }
        self.close_block();
        self.queues.close();
        info!("read {} blocks", self.blocks_produced);
        Ok(self.blocks_produced)
    }

    /// One step of the RLE1 state machine.
    fn rle_byte(&mut self, byte: u8) {
        let ch = byte as u16;
        if ch != self.rle_ch && self.rle_len == 1 {
            // Single byte fast path: flush it and track the new byte.
            let prev = self.rle_ch as u8;
            self.reserve(1).data.push(prev);
            self.block_crc = crc::update(self.block_crc, prev);
            self.rle_ch = ch;
        } else if ch == self.rle_ch && self.rle_len != MAX_RUN {
            self.rle_len += 1;
        } else {
            if self.rle_ch != NO_RUN {
                self.put_run();
            }
            self.rle_ch = ch;
            self.rle_len = 1;
        }
    }

    /// Flush the pending run as one RLE tuple of 1-5 bytes.
    fn put_run(&mut self) {
        let ch = self.rle_ch as u8;
        let run = self.rle_len;
        let needed = if run < 4 { run as usize } else { 5 };
        let block = self.reserve(needed);
        if run < 4 {
            for _ in 0..run {
                block.data.push(ch);
            }
        } else {
            block.data.extend_from_slice(&[ch, ch, ch, ch, (run - 4) as u8]);
        }
        // The CRC consumes every source byte of the run.
        for _ in 0..run {
            self.block_crc = crc::update(self.block_crc, ch);
        }
    }

    /// Make room for one tuple. A tuple never splits across blocks: if it
    /// would overflow the open block, that block is dispatched first.
    fn reserve(&mut self, needed: usize) -> &mut InputBlock {
        let full = self
            .block
            .as_ref()
            .is_some_and(|block| block.data.len() + needed > self.nblock_max);
        if full {
            self.close_block();
        }

        let queues = &self.queues;
        let next_id = &mut self.blocks_produced;
        let block_crc = &mut self.block_crc;
        self.block.get_or_insert_with(|| {
            *next_id += 1;
            *block_crc = crc::CRC_INIT;
            let mut block = queues.acquire_free();
            block.id = *next_id;
            block
        })
    }

    fn close_block(&mut self) {
        if let Some(mut block) = self.block.take() {
            block.crc = crc::finalise(self.block_crc);
            debug!(
                "block {}: {} bytes, crc {:08x}",
                block.id,
                block.data.len(),
                block.crc
            );
            self.queues.dispatch(block);
        }
    }
}
