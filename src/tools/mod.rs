//! Helper subsystems shared across the compression stages.
//!
//! - cli: command line interface.
//! - crc: bzip2 CRC32, both the per-block and the combined stream versions.
//! - freq_count: byte frequency counting.
//! - rle2_mtf: Move-To-Front transform and zero-run encoding (integrated for
//!   speed), performed between the BWT and Huffman stages.
//! - symbol_map: the bzip2 two-level symbol presence bitmap.
pub mod cli;
pub mod crc;
pub mod freq_count;
pub mod rle2_mtf;
pub mod symbol_map;
