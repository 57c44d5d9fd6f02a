use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use docai_canon::{
    canonical::{self, CanonicalResult},
    config::{self, get_config},
    logging::{self, ConsoleOutput},
    processing::{Capability, ProcessorRouter},
    provider::{self, mime_type_for_file_name},
};

#[derive(Parser)]
#[command(
    name = "docai-canon-cli",
    about = "Canonicalize Document AI output from the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Canonicalize a saved Document AI response without contacting the service.
    Canonicalize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Send a file to the processor configured for a capability.
    Process {
        #[arg(long)]
        capability: Capability,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        mime_type: Option<String>,
        /// Destination for the JSON result, or for the PDF when summarizing.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    logging::init_tracing(ConsoleOutput::Stderr);
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Canonicalize { input, output } => canonicalize(input, output),
        Command::Process {
            capability,
            file,
            mime_type,
            output,
        } => process(capability, file, mime_type, output).await,
    }
}

fn canonicalize(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let bytes =
        fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;
    let raw = provider::decode_document(&bytes)
        .with_context(|| format!("failed to decode {}", input.display()))?;
    let result = canonical::assemble(&raw).context("document has an invalid text anchor")?;
    write_json(&result, output)
}

async fn process(
    capability: Capability,
    file: PathBuf,
    mime_type: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    config::init_config();
    let config = get_config();
    let router = ProcessorRouter::from_config(config).context("failed to build Document AI client")?;

    let bytes = fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
    let mime_type = mime_type
        .or_else(|| {
            file.to_str()
                .and_then(mime_type_for_file_name)
                .map(str::to_string)
        })
        .unwrap_or_else(|| config.default_mime_type.clone());

    if capability == Capability::Summarize {
        let Some(output) = output else {
            bail!("--output is required when summarizing");
        };
        let pdf = router.summarize_to_pdf(&bytes, &mime_type).await?;
        fs::write(&output, pdf).with_context(|| format!("failed to write {}", output.display()))?;
        println!("Wrote summary PDF to {}", output.display());
        return Ok(());
    }

    let result = router.route_with_mime(capability, &bytes, &mime_type).await?;
    write_json(&result, output)
}

fn write_json(result: &CanonicalResult, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    match output {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
