mod logging;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as _, Subcommand};
use tracing::{debug, info};

use bcodec_core::bencoded::{self, Bencode, Parser, Saver};
use bcodec_core::metainfo::TorrentMeta;

use crate::logging::TracingConfig;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Debug, clap::Parser)]
#[command(version, about = "Inspect and transcode bencoded metadata files")]
struct Bcodec {
    #[command(flatten, next_display_order = 100)]
    tracing: TracingConfig,

    #[command(subcommand, next_display_order = 0)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Decode a metadata file into its record and encode it again")]
    Roundtrip { input: PathBuf, output: PathBuf },
    #[command(about = "Print the metadata record as JSON")]
    Show { input: PathBuf },
    #[command(about = "Print the piece digests, one per line")]
    Pieces { input: PathBuf },
    #[command(about = "Print every top-level value of a bencoded file")]
    Dump { input: PathBuf },
}

impl Command {
    fn run(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match self {
            Self::Roundtrip { input, output } => {
                let meta = read_meta(input)?;

                let mut target = BufWriter::new(File::create(output)?);
                Bencode.save(&meta, &mut target)?;
                target.flush()?;
                info!(output = %output.display(), "wrote re-encoded metadata");
            }
            Self::Show { input } => {
                let meta = read_meta(input)?;

                serde_json::to_writer_pretty(&mut out, &meta)?;
                writeln!(out)?;
            }
            Self::Pieces { input } => {
                let meta = read_meta(input)?;

                for hash in meta.info.piece_hashes()? {
                    writeln!(out, "{hash}")?;
                }
            }
            Self::Dump { input } => {
                let mut bytes = vec![];
                File::open(input)?.read_to_end(&mut bytes)?;

                let values = bencoded::decode_all(&bytes)?;
                debug!(count = values.len(), "decoded top-level values");
                for value in values {
                    writeln!(out, "{value:#?}")?;
                }
            }
        }

        Ok(())
    }
}

fn read_meta(path: &Path) -> Result<TorrentMeta> {
    let source = BufReader::new(File::open(path)?);
    let meta: TorrentMeta = Bencode.parse(source)?;
    info!(path = %path.display(), name = %meta.info.name, "read metadata");

    Ok(meta)
}

fn main() -> ExitCode {
    let bcodec = Bcodec::parse();
    bcodec.tracing.init();

    match bcodec.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
