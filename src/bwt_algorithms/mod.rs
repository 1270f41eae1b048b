//! The critical sorting subsystem for the block compressor.
//!
//! BZIP2 uses the Burrows-Wheeler Transform (BWT) to prepare data for
//! compression, which requires sorting every rotation of the block. Since
//! different sorting algorithms are better suited for different kinds of
//! data, this module carries two: a native comparison sort that parallelizes
//! well on ordinary data, and an SA-IS suffix sort that stays linear on the
//! highly repetitive data that makes comparison sorting degenerate.
pub mod bwt_sort;
pub mod sais;
