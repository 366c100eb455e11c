use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkrot::{host, Config, LinkClassifier, LinkService};
use outcome_client::{project_ref_from_url, software_products, AnalysisSummary, OutcomeClient};

#[derive(Parser)]
#[command(name = "linkrot")]
#[command(about = "Detect link rot and find archived copies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify links, one JSON result per line
    Check {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pretty-print each result
        #[arg(long)]
        pretty: bool,

        /// Maximum checks in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Probe timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Look up the closest archived copy of a URL
    Archive { url: String },

    /// Find software outcomes of a research project (project reference or GtR page URL)
    Analyze {
        project: String,

        /// Print the raw analysis response instead of the summary
        #[arg(long)]
        raw: bool,
    },

    /// Serve the browser extension over native messaging on stdin/stdout
    Host,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries results and native-messaging frames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("linkrot=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Check {
            urls,
            pretty,
            concurrency,
            timeout,
        } => {
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency.max(1);
            }
            if let Some(secs) = timeout {
                config.probe_timeout = Duration::from_secs(secs.max(1));
            }
            config.log_redacted();
            cmd_check(&config, &urls, pretty).await
        }
        Commands::Archive { url } => {
            config.log_redacted();
            cmd_archive(&config, &url).await
        }
        Commands::Analyze { project, raw } => {
            config.log_redacted();
            cmd_analyze(&config, &project, raw).await
        }
        Commands::Host => {
            config.log_redacted();
            let classifier = LinkClassifier::from_config(&config)?;
            let handled = host::run_stdio(&LinkService::new(classifier)).await?;
            info!(handled, "Native messaging host exiting");
            Ok(())
        }
    }
}

async fn cmd_check(config: &Config, urls: &[String], pretty: bool) -> Result<()> {
    let classifier = LinkClassifier::from_config(config)?;
    let results = classifier.classify_all(urls, config.concurrency).await;

    for result in &results {
        let line = if pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        println!("{line}");
    }

    let rotten = results.iter().filter(|r| r.status.is_rot()).count();
    info!(checked = results.len(), rotten, "Link check complete");
    Ok(())
}

async fn cmd_archive(config: &Config, url: &str) -> Result<()> {
    let classifier = LinkClassifier::from_config(config)?;
    let check = classifier
        .resolver()
        .check(url)
        .await
        .context("Failed to check archive")?;
    println!("{}", serde_json::to_string(&check)?);
    Ok(())
}

async fn cmd_analyze(config: &Config, project: &str, raw: bool) -> Result<()> {
    let project_ref = project_ref_from_url(project).unwrap_or_else(|| project.to_string());
    info!(project_ref = project_ref.as_str(), "Analyzing project outcomes");

    let client = OutcomeClient::new(&config.outcome_api_url, config.outcome_timeout)?;
    let analysis = client
        .analyze_project(&project_ref)
        .await
        .with_context(|| format!("Analysis failed for {project_ref}"))?;

    if raw {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let summary = AnalysisSummary::from_analysis(&analysis);
    println!("{}", summary.status_message());
    println!(
        "Total outcomes: {}  Classified as software: {}  Extracted: {}  Success rate: {}%",
        summary.total_outcomes,
        summary.classified_as_software,
        summary.extracted,
        summary.success_rate_percent
    );

    for product in software_products(&analysis) {
        println!();
        println!("{}", product.name);
        println!("  {}", product.description);
        for url in &product.urls {
            println!("  {url}");
        }
    }
    Ok(())
}
