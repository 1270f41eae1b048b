//! The three stage compression pipeline.
//!
//! ```text
//!       free pool ──────────────────────────────────┐
//!          ▲                                        │
//!          │ recycle                                ▼
//!   [Reader] ── busy queue ──► [Worker×N] ── add ──► [Writer]
//!                                                    │
//!                                                    ▼
//!                                                 output
//! ```
//!
//! The Reader applies RLE1 and slices blocks, N workers compress them, and
//! the Writer reassembles the variable-bit-length results in block id order.
//! The free pool bounds memory and provides back-pressure: the Reader stalls
//! when the workers fall behind.
pub mod reader;
pub mod worker;
pub mod writer;

use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

use log::debug;

use crate::bitstream::bitwriter::BitStreamWriter;
use crate::error::{Error, Result};
use reader::{BlockQueues, Reader};
use worker::worker_loop;
use writer::OutputWriter;

/// Output flushes to the sink in chunks of this size.
const OUTPUT_BUFFER_SIZE: usize = 1 << 20;

/// Free blocks beyond one per worker: enough slack that a transient writer
/// stall does not idle the reader, while keeping memory proportional to the
/// worker count.
const POOL_SLACK: usize = 2;

/// Compress `input` into a single bzip2 stream on `output`.
///
/// `block_size` is the bzip2 block size class 1-9 (x 100k bytes) and
/// `num_workers` the number of parallel compression threads. The output is
/// byte-identical for any worker count.
pub fn compress<R, W>(input: R, output: W, block_size: usize, num_workers: usize) -> Result<()>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    if !(1..=9).contains(&block_size) {
        return Err(Error::BlockSize(block_size));
    }
    let num_workers = num_workers.max(1);
    debug!(
        "pipeline start: {}00k blocks, {} workers",
        block_size, num_workers
    );

    let queues = Arc::new(BlockQueues::new(num_workers + POOL_SLACK, block_size));
    let writer = Arc::new(OutputWriter::new());

    let reader = Reader::new(input, Arc::clone(&queues), block_size);
    let reader_handle = thread::spawn(move || reader.run());

    let writer_handle = {
        let writer = Arc::clone(&writer);
        thread::spawn(move || {
            writer.run(BitStreamWriter::new(output, OUTPUT_BUFFER_SIZE), block_size)
        })
    };

    // Workers are detached; they exit on their own once the reader closes
    // the busy queue.
    for _ in 0..num_workers {
        let queues = Arc::clone(&queues);
        let writer = Arc::clone(&writer);
        thread::spawn(move || worker_loop(&queues, &writer));
    }

    // Join points: reader first (it learns the block count), then the
    // writer once it knows where the stream ends.
    let produced = reader_handle.join().expect("reader thread panicked")?;
    writer.set_last_block(produced);
    writer_handle
        .join()
        .expect("writer thread panicked")
        .map(|_| ())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use std::process::{Command, Stdio};
    use std::sync::Mutex;

    /// Write-half that the test keeps a handle on after `compress` consumes
    /// its clone.
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn compress_to_vec(data: &[u8], block_size: usize, workers: usize) -> Vec<u8> {
        let sink = SharedSink::default();
        compress(
            Cursor::new(data.to_vec()),
            sink.clone(),
            block_size,
            workers,
        )
        .unwrap();
        let out = sink.0.lock().unwrap().clone();
        out
    }

    fn pseudo_random(len: usize, mut state: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect()
    }

    #[test]
    fn empty_input_is_the_fourteen_byte_stream() {
        let out = compress_to_vec(b"", 1, 1);
        assert_eq!(
            out,
            vec![b'B', b'Z', b'h', b'1', 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0, 0, 0, 0]
        );
    }

    #[test]
    fn single_byte_stream_framing() {
        let out = compress_to_vec(b"a", 9, 4);
        assert_eq!(&out[..4], b"BZh9");
        // The first block starts byte aligned: magic then the block CRC.
        assert_eq!(&out[4..10], &[0x31, 0x41, 0x59, 0x26, 0x53, 0x59]);
        assert_eq!(&out[10..14], &0x19939b6b_u32.to_be_bytes());
    }

    #[test]
    fn invalid_block_size_is_rejected() {
        let sink = SharedSink::default();
        assert!(matches!(
            compress(Cursor::new(Vec::new()), sink, 10, 1),
            Err(Error::BlockSize(10))
        ));
    }

    #[test]
    fn output_is_independent_of_worker_count() {
        let data = pseudo_random(300_000, 0x2545_f491_4f6c_dd1d);
        let single = compress_to_vec(&data, 1, 1);
        for workers in [2, 4, 8] {
            assert_eq!(
                compress_to_vec(&data, 1, workers),
                single,
                "{} workers diverged",
                workers
            );
        }
    }

    #[test]
    fn worker_count_invariance_on_runs() {
        let data = vec![0x41_u8; 2 * 1024 * 1024];
        assert_eq!(compress_to_vec(&data, 1, 8), compress_to_vec(&data, 1, 1));
    }

    /// Round-trips through the system bzip2 binary when one is installed.
    fn system_bunzip2(compressed: &[u8]) -> Option<Vec<u8>> {
        let mut child = Command::new("bzip2")
            .args(["-d", "-c"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;
        let mut stdin = child.stdin.take().unwrap();
        let feed = {
            let compressed = compressed.to_vec();
            std::thread::spawn(move || {
                use std::io::Write as _;
                let _ = stdin.write_all(&compressed);
            })
        };
        let output = child.wait_with_output().ok()?;
        feed.join().unwrap();
        output.status.success().then_some(output.stdout)
    }

    #[test]
    fn reference_decoder_round_trip() {
        if system_bunzip2(&compress_to_vec(b"probe", 1, 1)).is_none() {
            eprintln!("bzip2 binary not available, skipping round trip test");
            return;
        }
        let cases: Vec<Vec<u8>> = vec![
            b"a".to_vec(),
            b"banana".to_vec(),
            b"The quick brown fox jumps over the lazy dog. ".repeat(200),
            vec![0x41; 2 * 1024 * 1024],
            pseudo_random(300_000, 0x853c_49e6_748f_ea9b),
            (0..=255_u8).collect::<Vec<u8>>().repeat(10),
        ];
        for data in cases {
            for (block_size, workers) in [(1, 4), (9, 2)] {
                let compressed = compress_to_vec(&data, block_size, workers);
                let restored = system_bunzip2(&compressed).expect("decoder rejected stream");
                assert_eq!(
                    restored,
                    data,
                    "round trip failed for {} bytes at class {}",
                    data.len(),
                    block_size
                );
            }
        }
    }
}
