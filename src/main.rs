use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgdedup::core::{
    discover_files, encode, hamming_distance, read_report, ConfigError, Decision, ImageRecord,
    QualityStrategy, ReportWriter, ScanConfig, ScanError, ScanProgress, ScanReport, Scanner,
    Tolerance, DEFAULT_HASH_SIZE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    name = "imgdedup",
    version,
    about = "Find near-duplicate images and keep the best copy of each"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy one image per group of near-duplicates into an output directory
    Dedupe {
        /// Directory to scan
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Existing directory that receives the kept images
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
        /// How similar images must be to count as duplicates (0 very similar, 5 somewhat similar)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        tolerance: i64,
        /// Keep the copy with the higher `resolution` or `file-size`
        #[arg(short = 'c', long, value_name = "STRATEGY", default_value = "resolution")]
        quality: String,
        /// Only print the decisions
        #[arg(short, long)]
        dry_run: bool,
        /// Append every decision to this JSON Lines file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
        /// Worker threads for decoding and hashing
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },

    /// Print the fingerprint of each image
    Hash {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Print the Hamming distance between two images
    Compare {
        #[arg(value_name = "FILE")]
        first: PathBuf,
        #[arg(value_name = "FILE")]
        second: PathBuf,
    },

    /// List the entries of a decision report
    Report {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {:#}", err);
            if is_config_error(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Dedupe {
            path,
            output,
            tolerance,
            quality,
            dry_run,
            report,
            jobs,
        } => {
            let config = ScanConfig::new(output)
                .with_tolerance(Tolerance::new(tolerance)?)
                .with_strategy(quality.parse::<QualityStrategy>()?)
                .with_dry_run(dry_run)
                .with_jobs(jobs);
            config.validate_input(&path)?;
            let scanner = Scanner::new(config)?;

            println!("▶ Scanning for near-duplicates in: {}", path.display());
            let images = list_files(&path)?;

            let bar = ProgressBar::new(images.len() as u64);
            bar.set_style(ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} {wide_msg}",
            )?);
            let ticker = bar.clone();
            let mut scanner = scanner.with_progress(Box::new(move |progress: &ScanProgress| {
                ticker.set_position(progress.processed as u64);
                ticker.set_message(progress.current_file.display().to_string());
            }));

            let scan = benchmark("fingerprinting and comparing", || scanner.run(&images));
            bar.finish_and_clear();
            let scan = scan?;

            print_decisions(&scan, dry_run);

            if let Some(report_path) = report {
                if dry_run {
                    println!("⚠️  Dry-run only; report not written.");
                } else {
                    let mut writer = ReportWriter::open(&report_path).with_context(|| {
                        format!("Failed to open report file {}", report_path.display())
                    })?;
                    writer.write_all(&scan.decisions).with_context(|| {
                        format!("Failed to write report file {}", report_path.display())
                    })?;
                    println!("✅ Recorded decisions in {}", report_path.display());
                }
            }

            if dry_run {
                println!("\n⚠️  Dry-run only; no files were changed.");
            }
            println!(
                "Found {} duplicates ({} kept, {} skipped)",
                scan.duplicates(),
                scan.retained.len(),
                scan.skipped()
            );
        }

        Commands::Hash { files } => {
            for file in files {
                match fingerprint_file(&file) {
                    Ok(hex) => println!("{}  {}", hex, file.display()),
                    Err(err) => eprintln!("⚠️  Skipping {}: {:#}", file.display(), err),
                }
            }
        }

        Commands::Compare { first, second } => {
            let (_, a) = ImageRecord::open(&first)?;
            let (_, b) = ImageRecord::open(&second)?;
            let a = encode(&a, DEFAULT_HASH_SIZE)?;
            let b = encode(&b, DEFAULT_HASH_SIZE)?;
            let distance = hamming_distance(&a, &b)?;

            println!("{}  {}", a, first.display());
            println!("{}  {}", b, second.display());
            println!("distance: {}", distance);
        }

        Commands::Report { file } => {
            let entries = read_report(&file)
                .with_context(|| format!("Could not read report file {}", file.display()))?;

            println!("🗂️  Decisions:");
            for (i, entry) in entries.iter().enumerate() {
                println!("[{}] {} {}", i, entry.timestamp, describe(&entry.decision));
            }
            let duplicates = entries
                .iter()
                .filter(|entry| entry.decision.is_duplicate())
                .count();
            println!("Found {} duplicates", duplicates);
        }
    }

    Ok(())
}

fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || matches!(cause.downcast_ref::<ScanError>(), Some(ScanError::Config(_)))
    })
}

/// List candidate files in `dir` behind a spinner.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message("Listing files…");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let files = discover_files(dir);

    spinner.finish_with_message(format!("Found {} files", files.len()));
    Ok(files)
}

fn fingerprint_file(path: &Path) -> Result<String> {
    let (_, image) = ImageRecord::open(path)?;
    Ok(encode(&image, DEFAULT_HASH_SIZE)?.to_hex())
}

fn print_decisions(scan: &ScanReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    for decision in &scan.decisions {
        println!("   {}{}", prefix, describe(decision));
    }
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Kept { image } => format!("🏆 KEEP {}", image.path.display()),
        Decision::Replaced { old, new, distance } => format!(
            "🔁 REPLACE {} → {} (distance {})",
            old.path.display(),
            new.path.display(),
            distance
        ),
        Decision::Dropped {
            image,
            kept_as,
            distance,
        } => format!(
            "📦 DROP {} (duplicate of {}, distance {})",
            image.path.display(),
            kept_as.path.display(),
            distance
        ),
        Decision::SkippedDecodeError { path, message }
        | Decision::SkippedIoError { path, message } => {
            format!("⚠️  SKIP {}: {}", path.display(), message)
        }
    }
}

/// Run `f()`, print how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    println!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
