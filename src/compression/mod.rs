//! The block compression primitive.
//!
//! One call compresses one prepared (post-RLE1) block through the BWT, MTF,
//! RLE2 and Huffman stages into a bit-length-precise payload.
pub mod compress_block;
