//! Huffman encoding, the final compression stage.
//!
//! BZIP2 uses Julian's multi-table scheme: several complete coding tables
//! are trained against the block, and every 50-symbol group is coded with
//! whichever table prices it cheapest.
pub mod huffman;
pub mod huffman_code_from_weights;
