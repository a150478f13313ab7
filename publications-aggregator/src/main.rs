use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use publications_aggregator::{PageTemplate, PublicationAggregator, PublicationsPipeline, SiteConfig};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// The publications page
    Html,
    /// The merged, sorted records
    Json,
}

/// Build the publications page from PubMed and the publications sheet.
#[derive(Debug, Parser)]
#[command(name = "publications", version)]
struct Cli {
    /// JSON site configuration; defaults are used for anything it omits
    #[arg(long, env = "PUBLICATIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Output file, or `-` for stdout
    #[arg(short, long, default_value = "publications.html")]
    output: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Page template with {{loading}}, {{list_state}}, {{filters}} and {{results}} slots
    #[arg(long)]
    template: Option<PathBuf>,

    /// Category selected when the page opens (`All` or a source label)
    #[arg(long)]
    filter: Option<String>,
}

fn load_config(path: Option<&PathBuf>) -> Result<SiteConfig> {
    let Some(path) = path else {
        return Ok(SiteConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SiteConfig::from_json(&raw).with_context(|| format!("loading config {}", path.display()))
}

fn write_output(target: &str, content: &str) -> Result<()> {
    if target == "-" {
        print!("{}", content);
        return Ok(());
    }
    fs::write(target, content).with_context(|| format!("writing {}", target))?;
    info!("Wrote {} ({} bytes)", target, content.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    info!("Starting publications build");

    match cli.format {
        OutputFormat::Json => {
            let aggregated = PublicationAggregator::from_config(&config)?.collect().await;
            let json = serde_json::to_string_pretty(&aggregated.records)?;
            write_output(&cli.output, &json)?;
        }
        OutputFormat::Html => {
            let mut pipeline = PublicationsPipeline::from_config(&config)?;
            if let Some(path) = &cli.template {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("reading template {}", path.display()))?;
                pipeline = pipeline.with_template(PageTemplate::new(source)?);
            }
            if let Some(filter) = &cli.filter {
                pipeline = pipeline.with_initial_filter(filter.as_str());
            }

            let outcome = pipeline.run().await;
            if !outcome.succeeded {
                warn!("Writing error page");
            }
            write_output(&cli.output, &outcome.html)?;
        }
    }

    info!("Publications build finished");
    Ok(())
}
