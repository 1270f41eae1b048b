//! Parallel bzip2 compression.
//!
//! - Produces streams with byte-level compatibility to the reference bzip2
//!   format: any conformant decoder recovers the original input.
//! - Splits the input into independently compressible blocks and compresses
//!   them on multiple cores, reassembling the variable-bit-length results in
//!   order.
//! - Output is independent of the worker count.
//!
//! Basic usage from the command line:
//!
//! ```text
//! $> parbzip2 -9 -p 8 test.txt
//! ```
//!
//! This compresses `test.txt` into `test.txt.bz2` using 900k blocks and eight
//! worker threads. Without file arguments the compressor reads standard input
//! and writes standard output.
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod pipeline;
pub mod tools;

pub use error::{Error, Result};
pub use pipeline::compress;
