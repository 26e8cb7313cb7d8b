use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

/// Bijective arithmetic coder.
///
/// Compresses or decompresses a file. The two operations are inverse
/// bijections on byte streams, so any file at all is valid input to either.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// c to compress, d to decompress
    mode: String,

    /// Input file path
    infile: PathBuf,

    /// Output file path
    outfile: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::from(100),
            };
        }
    };

    let decompressing = match args.mode.as_str() {
        "c" | "C" => false,
        "d" | "D" => true,
        other => {
            eprintln!("unknown mode '{other}': use c to compress or d to decompress");
            return ExitCode::from(100);
        }
    };

    let infile = match File::open(&args.infile) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("could not read {}: {err}", args.infile.display());
            return ExitCode::from(1);
        }
    };
    let outfile = match File::create(&args.outfile) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("could not write {}: {err}", args.outfile.display());
            return ExitCode::from(2);
        }
    };

    let input = BufReader::new(infile);
    let output = BufWriter::new(outfile);

    let result = if decompressing {
        biarith::decompress(input, output)
    } else {
        biarith::compress(input, output)
    };

    match result {
        Ok(count) => {
            if decompressing {
                info!(
                    "decompressed {} to {} ({count} bytes out)",
                    args.infile.display(),
                    args.outfile.display()
                );
            } else {
                info!(
                    "compressed {} to {} ({count} bytes in)",
                    args.infile.display(),
                    args.outfile.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error processing {}: {err}", args.infile.display());
            ExitCode::from(10)
        }
    }
}
