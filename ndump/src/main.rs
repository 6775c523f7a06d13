use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use nalu_reader::{Framing, Nalu, NaluFile, StreamSummary};

/// Lists the NAL units of an H.264 elementary stream.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[arg(short, long)]
    file_path: PathBuf,

    /// How units are delimited: annexb, avcc, or len1 to len4.
    #[arg(short = 'm', long, default_value = "annexb")]
    framing: Framing,

    /// Print unit counts per type instead of one line per unit.
    #[arg(long)]
    summary: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = match verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn describe(nalu: &Nalu) -> String {
    format!(
        "offset={} size={} framing_size={} header_size={} payload_size={} ref_idc={} type={} ({})",
        nalu.offset(),
        nalu.data().len(),
        nalu.framing_size(),
        nalu.header_size(),
        nalu.payload_size(),
        nalu.ref_idc(),
        nalu.unit_type(),
        nalu.nal_unit_type()
    )
}

fn write_summary(out: &mut impl Write, summary: &StreamSummary) -> io::Result<()> {
    writeln!(out, "units={}", summary.unit_count())?;
    writeln!(out, "payload_bytes={}", summary.payload_bytes())?;
    writeln!(out, "framing_bytes={}", summary.framing_bytes())?;
    for (unit_type, count) in summary.type_counts() {
        writeln!(
            out,
            "type={} ({}) count={}",
            unit_type.nal_unit_type(),
            unit_type,
            count
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let Args {
        file_path,
        framing,
        summary,
        verbose,
    } = Args::parse();
    init_logging(verbose);

    let file = NaluFile::from_file_path(&file_path, framing)
        .with_context(|| format!("unable to open {}", file_path.display()))?;
    info!(
        "reading {} bytes from {} as {}",
        file.data().len(),
        file_path.display(),
        file.framing()
    );

    let mut out = io::stdout().lock();
    if summary {
        let summary = file
            .summarize()
            .with_context(|| format!("unable to read {}", file_path.display()))?;
        write_summary(&mut out, &summary)?;
        return Ok(());
    }

    for nalu in file.reader() {
        let nalu = nalu.with_context(|| format!("unable to read {}", file_path.display()))?;
        writeln!(out, "{}", describe(&nalu))?;
    }

    Ok(())
}
