use std::io;

use thiserror::Error;

/// Fatal conditions. Every variant aborts the current compression; the
/// binary reports the message and exits with status 1.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    #[error("can't open input file {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("can't create output file {path}: {source}")]
    Create { path: String, source: io::Error },

    #[error("output file {0} already exists (use --force to overwrite)")]
    OutputExists(String),

    #[error("invalid block size class {0}: must be 1-9")]
    BlockSize(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
