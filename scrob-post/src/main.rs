//! scrob-post - Announce last month's top Last.fm album on Mastodon

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use libscrobblecast::logging::{LogFormat, LoggingConfig};
use libscrobblecast::platforms::mastodon::MastodonClient;
use libscrobblecast::scrobbles::lastfm::LastfmClient;
use libscrobblecast::{Config, MonthlyRun, RunOptions, RunOutcome};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "scrob-post")]
#[command(version, about = "Announce last month's top Last.fm album on Mastodon")]
#[command(long_about = r#"Announce last month's top Last.fm album on Mastodon.

Meant to be run daily by cron or a systemd timer: it only does work on the
first day of the month.

CONFIGURATION:
    LASTFM_API_KEY, LASTFM_API_SECRET, LASTFM_USERNAME, LASTFM_PASSWORD,
    MASTODON_ACCESS_TOKEN and MASTODON_BASE_URL must be set, either in the
    environment, in a .env file, or in the config file
    ($SCROBBLECAST_CONFIG or ~/.config/scrobblecast/config.toml).

EXIT CODES:
    0 - Success, nothing to do, or a runtime failure (logged)
    1 - Missing or invalid configuration
    With --strict, runtime failures exit 1 (2 for rejected credentials)
"#)]
struct Cli {
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Run even if today is not the first of the month
    #[arg(long)]
    force: bool,

    /// Print the message instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Exit non-zero when the run fails
    #[arg(long)]
    strict: bool,

    /// Log format (text, json or pretty)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Alternate Last.fm API root
    #[arg(long, env = "SCROBBLECAST_LASTFM_API_ROOT", hide = true)]
    lastfm_api_root: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let mut logging = LoggingConfig::from_env(cli.verbose);
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    logging.init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}. Please check the README for more information.", e);
            std::process::exit(e.exit_code());
        }
    };

    let code = match run(&cli, config).await {
        Ok(outcome) => {
            if let RunOutcome::DryRun { message, .. } = &outcome {
                println!("{}", message);
            }
            outcome.exit_code(cli.strict)
        }
        Err(e) => {
            error!("{:#}", e);
            if cli.strict {
                1
            } else {
                0
            }
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli, config: Config) -> Result<RunOutcome> {
    let mut source = LastfmClient::from_config(&config.lastfm);
    if let Some(root) = &cli.lastfm_api_root {
        source = source.with_api_root(root.clone());
    }

    let platform = MastodonClient::from_config(&config.mastodon)
        .context("Failed to set up the Mastodon client")?;

    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut monthly = MonthlyRun::new(source, platform).with_options(RunOptions {
        force: cli.force,
        dry_run: cli.dry_run,
    });

    Ok(monthly.run(today).await)
}
