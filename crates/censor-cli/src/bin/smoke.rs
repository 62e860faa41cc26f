//! censor-smoke: end-to-end checks for a classifier deployment.
//!
//! 1. classifies a sample in-process with the configured backend
//! 2. POSTs a sample to a running `/classify` service
//!
//! Run with: cargo run -p censor-cli --bin censor-smoke -- --url http://localhost:8000

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use censor_classifier::Classifier;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "censor-smoke", version, about = "Smoke-test the classifier and a /classify service")]
struct Args {
    /// Base URL of the service exposing POST /classify
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// HTTP timeout for the service check, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[arg(long)]
    skip_direct: bool,

    #[arg(long)]
    skip_http: bool,

    /// Path to censor.toml
    #[arg(long, env = "CENSOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    censor_cli::init_tracing();
    let args = Args::parse();

    let mut results: Vec<(&str, bool)> = Vec::new();

    if !args.skip_direct {
        results.push(("Direct classifier", direct_check(&args).await));
    }
    if !args.skip_http {
        results.push(("HTTP /classify", http_check(&args).await));
    }

    println!("\n=== Summary ===");
    for (name, passed) in &results {
        println!("{:<20} {}", name, if *passed { "PASS" } else { "FAIL" });
    }

    if results.iter().all(|(_, passed)| *passed) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn direct_check(args: &Args) -> bool {
    println!("Testing classifier directly...");
    let start = Instant::now();

    let classifier = match censor_cli::load_config(args.config.as_deref(), None, None) {
        Ok(config) => Classifier::new(config).await,
        Err(e) => {
            println!("  config error: {e}");
            return false;
        }
    };
    let classifier = match classifier {
        Ok(c) => c,
        Err(e) => {
            println!("  construction failed: {e}");
            return false;
        }
    };
    info!(backend = classifier.backend_kind().as_str(), model = classifier.model_id(), "Direct check");

    let result = classifier.classify(&censor_cli::action_scene_sample()).await;
    println!("  Rating: {}", result.rating);
    println!("  Reason: {}", result.reason);
    println!("  took {:.2?}", start.elapsed());
    true
}

async fn http_check(args: &Args) -> bool {
    println!("Testing {}/classify ...", args.url.trim_end_matches('/'));
    let timeout = Duration::from_secs(args.timeout_secs);

    match censor_cli::check_service(&args.url, &censor_cli::family_sample(), timeout).await {
        Ok(result) => {
            println!("  Rating: {}", result.rating);
            println!("  Reason: {}", result.reason);
            true
        }
        Err(e) => {
            println!("  failed: {e:#}");
            false
        }
    }
}
