use anyhow::Result;
use clap::{Parser, Subcommand};
use pagevault_core::indexer::DocChange;
use pagevault_core::{Archive, EngineConfig, ScanRecord, SledStore};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Ingest scanned pages into the archive and query it", long_about = None)]
struct Cli {
    /// Archive database directory
    #[arg(long, default_value = "./archive")]
    db: String,
    /// Optional engine config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index scan records from a JSON/JSONL file or a directory of them
    Ingest {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
    /// Run a query and print ranked results
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
    /// List the most recently added pages
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print indexed words starting with a prefix
    Suggest {
        prefix: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Default)]
struct Tally { created: usize, updated: usize, unchanged: usize }

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref())?;
    let kv = SledStore::open(&cli.db)?;
    let archive = Archive::new(&kv, &config);

    match cli.command {
        Commands::Ingest { input } => {
            ingest(&archive, &input)?;
            kv.flush()?;
        }
        Commands::Search { query, k } => {
            let results = archive.search(&query, k)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Recent { limit } => {
            for doc in archive.recent(limit)? {
                println!("{}\t{}\t{}", doc.id, doc.url, doc.title);
            }
        }
        Commands::Suggest { prefix, limit } => {
            for word in archive.suggest(&prefix, limit)? {
                println!("{word}");
            }
        }
    }
    Ok(())
}

fn ingest(archive: &Archive<&SledStore>, input: &str) -> Result<()> {
    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }

    let mut tally = Tally::default();
    for file in files {
        tracing::debug!(file = %file.display(), "reading scan records");
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            index_jsonl(archive, &file, &mut tally)?;
        } else {
            index_json(archive, &file, &mut tally)?;
        }
    }

    tracing::info!(created = tally.created, updated = tally.updated, unchanged = tally.unchanged, "ingest complete");
    Ok(())
}

fn index_jsonl(archive: &Archive<&SledStore>, file: &Path, tally: &mut Tally) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let scan: ScanRecord = serde_json::from_str(&line)?;
        index_one(archive, &scan, tally)?;
    }
    Ok(())
}

fn index_json(archive: &Archive<&SledStore>, file: &Path, tally: &mut Tally) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let scan: ScanRecord = serde_json::from_value(v)?;
                index_one(archive, &scan, tally)?;
            }
        }
        serde_json::Value::Object(_) => {
            let scan: ScanRecord = serde_json::from_value(json)?;
            index_one(archive, &scan, tally)?;
        }
        _ => tracing::warn!(file = %file.display(), "expected a scan record object or array"),
    }
    Ok(())
}

fn index_one(archive: &Archive<&SledStore>, scan: &ScanRecord, tally: &mut Tally) -> Result<()> {
    let report = archive.index(scan)?;
    match report.change {
        DocChange::Created => tally.created += 1,
        DocChange::Updated => tally.updated += 1,
        DocChange::Unchanged => tally.unchanged += 1,
    }
    Ok(())
}
