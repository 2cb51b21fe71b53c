//! Standalone gold rate probe.
//!
//! Fetches the rate page (or reads a saved copy) and prints the rate the
//! bot would reply with, for checking the page layout without Telegram.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gold_rate_bot::config::{DEFAULT_CONTAINER_CLASS, DEFAULT_SOURCE_URL};
use gold_rate_bot::rate::{PageFetcher, RATE_NOT_FOUND, extract_cell_text, parse_price};

/// Gold rate page probe.
#[derive(Parser, Debug)]
#[command(name = "gold_rate")]
#[command(about = "Prints today's gold rate as extracted from the rate page")]
#[command(version)]
struct Args {
    /// Read the page from a saved HTML file instead of fetching it.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Page to fetch.
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    url: String,

    /// Class of the element wrapping the rate table.
    #[arg(long, default_value = DEFAULT_CONTAINER_CLASS)]
    class: String,

    /// Show the raw cell text as well as the parsed rate.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let Some(html) = load_page(&args).await else {
        println!("{RATE_NOT_FOUND}");
        return ExitCode::FAILURE;
    };

    report(&html, &args.class, args.verbose)
}

async fn load_page(args: &Args) -> Option<String> {
    if let Some(path) = &args.file {
        return match std::fs::read_to_string(path) {
            Ok(html) => Some(html),
            Err(e) => {
                eprintln!("✗ Failed to read {}: {e}", path.display());
                None
            }
        };
    }

    let fetcher = match PageFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("✗ Failed to create HTTP client: {e}");
            return None;
        }
    };

    match fetcher.fetch(&args.url).await {
        Ok(html) => Some(html),
        Err(e) => {
            eprintln!("✗ {e}");
            None
        }
    }
}

fn report(html: &str, class: &str, verbose: bool) -> ExitCode {
    let cell = match extract_cell_text(html, class) {
        Ok(cell) => cell,
        Err(e) => {
            eprintln!("✗ {e}");
            println!("{RATE_NOT_FOUND}");
            return ExitCode::FAILURE;
        }
    };

    if verbose {
        eprintln!("Cell text: \"{cell}\"");
    }

    match parse_price(&cell) {
        Ok(price) => {
            println!("{price}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {e}");
            println!("{RATE_NOT_FOUND}");
            ExitCode::FAILURE
        }
    }
}
