//! dorkscan CLI
//!
//! Runs a file of search-engine dorks one at a time, with randomized delays
//! and proxy rotation, and saves the result URLs.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::subscriber::DefaultGuard;
use tracing::{error, info, warn};

use dorkscan_core::{
    parse_result_cap, resolve_output_path, RunConfig, DEFAULT_MAX_DELAY, DEFAULT_MAX_RESULTS,
    DEFAULT_MIN_DELAY, DEFAULT_VERBOSITY,
};
use dorkscan_net::{GoogleConfig, GoogleSearch, SharedProvider};
use dorkscan_runtime::{Orchestrator, RunError};

#[derive(Parser, Debug)]
#[command(name = "dorkscan")]
#[command(author, version, about = "dorkscan: automated search-engine dork runs", long_about = None)]
struct Cli {
    /// File containing one dork per line
    #[arg(short = 'g', long)]
    dorks_file: PathBuf,

    /// Restrict every search to this domain (site:<domain>)
    #[arg(short, long, default_value = "")]
    domain: String,

    /// Maximum result URLs to request per dork
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_RESULTS as i64, allow_negative_numbers = true)]
    max_results: i64,

    /// Save the JSON report (default: dorkscan_results_<TIMESTAMP>.json)
    #[arg(short = 's', long, num_args = 0..=1, value_name = "PATH")]
    save_json: Option<Option<PathBuf>>,

    /// Append per-dork URL lists (default: dorkscan_results_<TIMESTAMP>.txt)
    #[arg(short = 'o', long, num_args = 0..=1, value_name = "PATH")]
    save_urls: Option<Option<PathBuf>>,

    /// Comma-separated proxies to rotate through (http, https, socks5, socks5h)
    #[arg(short, long, default_value = "", env = "DORKSCAN_PROXIES")]
    proxies: String,

    /// Minimum delay between dork searches (seconds)
    #[arg(short = 'i', long, default_value_t = DEFAULT_MIN_DELAY, allow_negative_numbers = true)]
    min_delay: f64,

    /// Maximum delay between dork searches (seconds)
    #[arg(short = 'x', long, default_value_t = DEFAULT_MAX_DELAY, allow_negative_numbers = true)]
    max_delay: f64,

    /// Do not verify TLS certificates (needed for proxies with self-signed certificates)
    #[arg(long)]
    disable_ssl_verification: bool,

    /// Verbosity level (0 = silent ... 5 = debug)
    #[arg(short, long, default_value_t = DEFAULT_VERBOSITY, value_parser = clap::value_parser!(u8).range(0..=5))]
    verbosity: u8,

    /// Log file (appended to)
    #[arg(short, long, default_value = "dorkscan.log")]
    log_file: PathBuf,

    /// Seed for the delay pool, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Google top-level domain to search
    #[arg(long, default_value = "com")]
    tld: String,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = RunConfig::new(&self.dorks_file)
            .with_domain(&self.domain)
            .with_max_results(parse_result_cap(self.max_results)?)
            .with_delays(self.min_delay, self.max_delay)
            .with_proxies(&self.proxies)
            .with_verify_tls(!self.disable_ssl_verification)
            .with_verbosity(self.verbosity);

        if let Some(path) = resolve_output_path(self.save_json.clone(), ".json") {
            config = config.with_save_json(path);
        }
        if let Some(path) = resolve_output_path(self.save_urls.clone(), ".txt") {
            config = config.with_save_urls(path);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        Ok(config)
    }
}

/// Validate the configuration, then install the log sinks.
///
/// A bad dork file or delay range fails here, before the log file is touched.
fn startup(cli: &Cli) -> Result<(RunConfig, DefaultGuard)> {
    let config = cli.run_config()?;
    config.validate()?;
    let guard = logging::init(&cli.log_file, cli.verbosity)?;
    Ok((config, guard))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, _log_guard) = match startup(&cli) {
        Ok(started) => started,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<RunError>()
                .map(RunError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: &Cli, config: RunConfig) -> Result<()> {
    let provider: SharedProvider = Arc::new(GoogleSearch::new(GoogleConfig {
        tld: cli.tld.clone(),
        ..Default::default()
    }));

    let cancel = CancellationToken::new();
    let mut orchestrator =
        Orchestrator::new(config.clone(), provider)?.with_cancellation(cancel.clone());
    info!(
        "Loaded {} dorks from {}",
        orchestrator.dorks().len(),
        config.dorks_file.display()
    );
    if !config.verify_tls {
        warn!("TLS certificate verification is disabled");
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let report = orchestrator.run().await?;

    if let Some(path) = &config.save_urls {
        info!("URL lists appended to: {}", path.display());
    }
    info!("Run finished: {} URLs across {} dorks", report.total_urls_found(), report.dork_count());

    Ok(())
}
