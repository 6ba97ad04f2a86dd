//! seo-audit CLI - fetch a page, run every analyzer and print the report as JSON.

use anyhow::{Context, Result};
use clap::Parser;

use seo_audit::config::AuditConfig;
use seo_audit::lifecycle::init_logging;
use seo_audit::service::AuditService;

/// Exit code when the page could not be retrieved.
const EXIT_FETCH_FAILURE: i32 = 2;

/// Heuristic SEO audit of a single URL
#[derive(Parser)]
#[command(name = "seo-audit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Page to audit (http or https)
    url: String,

    /// Target keywords for the semantic estimate, comma separated
    #[arg(long, value_delimiter = ',')]
    keywords: Vec<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Fetch timeout in seconds (overrides SEO_AUDIT_FETCH_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = AuditConfig::from_env();
    if let Some(secs) = cli.timeout {
        config = config.with_fetch_timeout(secs);
    }

    let service = AuditService::from_config(&config).context("Failed to initialize audit service")?;
    let keywords: Vec<String> = cli
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let report = match service.run_audit(&cli.url, &keywords).await {
        Ok(report) => report,
        Err(e) if e.is_fetch_failure() => {
            tracing::error!("Could not fetch {}: {}", cli.url, e);
            std::process::exit(EXIT_FETCH_FAILURE);
        }
        Err(e) => return Err(e).context(format!("Audit of {} failed", cli.url)),
    };

    let json = if cli.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("Failed to serialize report")?;

    println!("{}", json);
    Ok(())
}
