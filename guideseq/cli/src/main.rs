use clap::Parser;
use eyre::{Result, WrapErr};
use rayon::ThreadPoolBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use guideseq_countit_rs::{parallelism, Engine, LiteralMatcher, Matcher, Table};
use guideseq_io_rs::{compression::decode, fastq, guides};

/// Search guide sequences in a FASTQ file and report per-gene/exon occurrence counts.
///
/// Reads the FASTQ file once, keeps the nucleotide strings, then counts for every guide of the
/// catalog how many reads contain it. The output is a tab-separated table with one row per
/// distinct (gene, exon) annotation, in catalog order.
#[derive(Parser, Debug)]
#[command(name = "guideseq", version)]
struct Args {
    /// Path to the input FASTQ file, plain or gzip-compressed
    #[arg(short, long)]
    fastq: PathBuf,

    /// Path to the guide catalog: a TSV table with CODE, GENES, and EXONE columns
    #[arg(short, long)]
    tsv: PathBuf,

    /// Path to the output TSV table
    #[arg(short, long)]
    output: PathBuf,

    /// Worker threads. Negative values count back from the machine maximum: -1 is all cores
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    threads: isize,

    /// Number of chunks the read set is split into. Defaults to the number of worker threads
    #[arg(long)]
    chunks: Option<usize>,
}

fn load_catalog(path: &PathBuf) -> Result<Vec<guides::Record>> {
    let config = decode::Config::infer_from_file(path)?;
    let mut reader = guides::Reader::from_path(path, &config)?;

    let mut records = Vec::new();
    reader
        .read_to_end(&mut records)
        .wrap_err_with(|| format!("Failed to read the guide catalog: {}", path.display()))?;
    Ok(records)
}

fn load_sequences(path: &PathBuf) -> Result<Vec<Vec<u8>>> {
    let config = decode::Config::infer_from_file(path)?;
    let mut reader = fastq::Reader::from_path(path, &config)?;

    let mut records = Vec::new();
    reader
        .read_to_end(&mut records)
        .wrap_err_with(|| format!("Failed to read the FASTQ file: {}", path.display()))?;

    // Only the nucleotide strings matter downstream, titles and qualities are dropped here
    Ok(records.into_iter().map(|x| x.dissolve().1).collect())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalog = load_catalog(&args.tsv)?;
    log::info!("Loaded {} guides from {}", catalog.len(), args.tsv.display());

    let sequences = load_sequences(&args.fastq)?;
    log::info!(
        "Loaded {} reads from {}",
        sequences.len(),
        args.fastq.display()
    );

    let threads = parallelism::workers(args.threads)?;
    let chunks = args.chunks.unwrap_or(threads);
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .use_current_thread()
        .build()?;

    let mut engine = Engine::builder()
        .add_guides(catalog.into_iter().map(|record| {
            let matcher: Box<dyn Matcher> = Box::new(LiteralMatcher::new(record.code()));
            (matcher, record)
        }))
        .set_thread_pool(pool)
        .build();

    let counts = engine.run(&sequences, chunks)?;
    for summary in counts.stats() {
        log::debug!(
            "Chunk #{}: {} reads, {} tasks, {:.3}s total",
            summary.chunk(),
            summary.reads(),
            summary.tasks(),
            summary.time_s()
        );
    }

    let table = Table::from_counts(&counts);
    let mut writer = BufWriter::new(
        File::create(&args.output)
            .wrap_err_with(|| format!("Failed to create {}", args.output.display()))?,
    );
    table.write_tsv(&mut writer)?;
    writer.flush()?;

    println!("Done.");
    Ok(())
}
