//! Bit-granular output.
//!
//! - bitpacker: packs one compressed block into an in-memory buffer and
//!   reports its exact bit length.
//! - bitwriter: concatenates payloads of arbitrary bit length onto an output
//!   sink, MSB first, through a bounded buffer.
pub mod bitpacker;
pub mod bitwriter;
