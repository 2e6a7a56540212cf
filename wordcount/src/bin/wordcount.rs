//! Simple word count, run through both the RDD API and the DataFrame API.
//!
//! Writes `sample_text.txt` (unless `--input` names an existing file), prints
//! every stage of the RDD pipeline, then the DataFrame result as a table.
//!
//! ```bash
//! cargo run --bin wordcount -- --master "local[2]"
//! ```

use anyhow::{Context, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use wisp_core::config::DEFAULT_MASTER;
use wisp_core::sql::WispSession;
use wisp_wordcount::{DataFrameWordCount, RddWordCount, write_sample_file};

const EXIT_SESSION_FAILED: u8 = 1;
const EXIT_SAMPLE_FILE_FAILED: u8 = 2;
const EXIT_WORD_COUNT_FAILED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "wordcount", version, about = "Count words with the RDD and DataFrame APIs")]
struct Args {
    /// Application name
    #[arg(long, default_value = "SimpleWordCount")]
    app_name: String,

    /// Master: local, local[N] or local[*]
    #[arg(long, default_value = DEFAULT_MASTER)]
    master: String,

    /// Directory the sample file is written to
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Count an existing file instead of writing the sample
    #[arg(long, conflicts_with = "dir")]
    input: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    println!("Initializing session...");
    let session = match WispSession::builder()
        .app_name(args.app_name.as_str())
        .master(&args.master)
        .create()
    {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to initialize session: {:#}", anyhow::Error::new(e));
            return ExitCode::from(EXIT_SESSION_FAILED);
        }
    };
    println!("Session initialized successfully.");

    let path = match args.input {
        Some(path) => path,
        None => match write_sample_file(&args.dir) {
            Ok(path) => {
                println!("Sample file created: {}", path.display());
                path
            }
            Err(e) => {
                error!("Failed to create sample file: {:#}", anyhow::Error::new(e));
                session.stop();
                return ExitCode::from(EXIT_SAMPLE_FILE_FAILED);
            }
        },
    };

    if let Err(e) = run(&session, &path).await {
        error!("Word count failed: {:#}", e);
        session.stop();
        return ExitCode::from(EXIT_WORD_COUNT_FAILED);
    }

    session.stop();
    println!("\nSession stopped.");
    ExitCode::SUCCESS
}

async fn run(session: &WispSession, path: &Path) -> anyhow::Result<()> {
    println!("Reading file: {}", path.display());
    let rdd = RddWordCount::run(session.flow_context(), path)
        .with_context(|| format!("RDD word count of {} failed", path.display()))?;

    println!("\n--- Original Lines (RDD) ---");
    for line in &rdd.lines {
        println!("{}", line);
    }

    println!("\n--- Individual Words (RDD) ---");
    for token in &rdd.tokens {
        println!("{}", token);
    }

    println!("\n--- Word Pairs (RDD) ---");
    for (word, one) in &rdd.pairs {
        println!("('{}', {})", word, one);
    }

    println!("\n--- Word Counts (Result) ---");
    print!("{}", rdd.counts);

    let df = DataFrameWordCount::run(session, path)
        .await
        .with_context(|| format!("DataFrame word count of {} failed", path.display()))?;

    println!("\n--- Word Count using DataFrames ---");
    println!("{}", df.table);

    if df.counts != rdd.counts {
        bail!("RDD and DataFrame word counts disagree");
    }
    info!(
        "Counted {} words ({} distinct) in {}",
        rdd.counts.total(),
        rdd.counts.distinct(),
        path.display()
    );
    Ok(())
}
