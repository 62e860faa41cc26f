//! censor-classify: rate one piece of content from the command line.
//!
//! Usage: censor-classify '{"metadata": {}, "transcript": "text", "vision_labels": ["label1"]}'

use std::path::PathBuf;
use std::process::ExitCode;

use censor_classifier::{BackendKind, Classifier};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "censor-classify", version, about = "Rate media content as 6+, 12+, 16+ or 18+")]
struct Args {
    /// JSON object with optional `metadata`, `transcript` and `vision_labels`
    input: String,

    /// Backend: openai, huggingface or auto (overrides the config file)
    #[arg(long, env = "CENSOR_BACKEND")]
    backend: Option<BackendKind>,

    /// Local model id on the Hugging Face Hub
    #[arg(long)]
    model: Option<String>,

    /// Path to censor.toml
    #[arg(long, env = "CENSOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    censor_cli::init_tracing();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let input = censor_cli::parse_input(&args.input)?;
    let config = censor_cli::load_config(args.config.as_deref(), args.backend, args.model)?;

    let classifier = Classifier::new(config).await?;
    let result = classifier.classify(&input).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
