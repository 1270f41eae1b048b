//! Command line interface, built on clap.

use clap::{ArgAction, Parser};
use log::LevelFilter;

/// A parallel bzip2 compressor.
#[derive(Parser, Debug)]
#[command(
    name = "parbzip2",
    version,
    about = "Parallel block-sorting file compressor",
    long_about = None
)]
pub struct Args {
    /// Set block size to 100k
    #[arg(short = '1', group = "block_size")]
    size_100k: bool,

    /// Set block size to 200k
    #[arg(short = '2', group = "block_size")]
    size_200k: bool,

    /// Set block size to 300k
    #[arg(short = '3', group = "block_size")]
    size_300k: bool,

    /// Set block size to 400k
    #[arg(short = '4', group = "block_size")]
    size_400k: bool,

    /// Set block size to 500k
    #[arg(short = '5', group = "block_size")]
    size_500k: bool,

    /// Set block size to 600k
    #[arg(short = '6', group = "block_size")]
    size_600k: bool,

    /// Set block size to 700k
    #[arg(short = '7', group = "block_size")]
    size_700k: bool,

    /// Set block size to 800k
    #[arg(short = '8', group = "block_size")]
    size_800k: bool,

    /// Set block size to 900k (the default)
    #[arg(short = '9', group = "block_size")]
    size_900k: bool,

    /// Use N parallel worker threads (default: online CPU count)
    #[arg(short = 'p', long = "processors", value_name = "N", default_value_t = num_cpus::get().max(1))]
    pub processors: usize,

    /// Keep (don't delete) input files
    #[arg(short = 'k', long = "keep")]
    pub keep: bool,

    /// Overwrite existing output files
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Write to standard output; input files are kept
    #[arg(short = 'c', long = "stdout")]
    pub stdout: bool,

    /// Be verbose (repeat for more detail)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Files to compress, each to <FILE>.bz2. With no files, compresses
    /// standard input to standard output
    pub files: Vec<String>,
}

impl Args {
    /// The selected block size class, 1-9.
    pub fn block_size(&self) -> usize {
        let flags = [
            self.size_100k,
            self.size_200k,
            self.size_300k,
            self.size_400k,
            self.size_500k,
            self.size_600k,
            self.size_700k,
            self.size_800k,
            self.size_900k,
        ];
        flags.iter().position(|&set| set).map_or(9, |i| i + 1)
    }

    /// Log level from the -v count.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
