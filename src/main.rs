use std::fs::{self, File};
use std::io;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use log::{error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use parbzip2::tools::cli::Args;
use parbzip2::{compress, Error, Result};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Logs go to stderr so --stdout streams stay clean.
    TermLogger::init(
        args.log_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("logger init");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let block_size = args.block_size();
    let workers = args.processors.max(1);

    if args.files.is_empty() {
        info!("compressing standard input with {} workers", workers);
        return compress(io::stdin(), io::stdout(), block_size, workers);
    }

    for path in &args.files {
        compress_file(path, args, block_size, workers)?;
    }
    Ok(())
}

fn compress_file(path: &str, args: &Args, block_size: usize, workers: usize) -> Result<()> {
    let input = File::open(path).map_err(|source| Error::Open {
        path: path.to_string(),
        source,
    })?;

    if args.stdout {
        info!("{} -> stdout", path);
        return compress(input, io::stdout(), block_size, workers);
    }

    let target = format!("{path}.bz2");
    if !args.force && fs::metadata(&target).is_ok() {
        return Err(Error::OutputExists(target));
    }
    let output = File::create(&target).map_err(|source| Error::Create {
        path: target.clone(),
        source,
    })?;

    info!("{} -> {}", path, target);
    compress(input, output, block_size, workers)?;

    if !args.keep {
        let _ = fs::remove_file(path);
    }
    Ok(())
}
