pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod oauth;
pub mod record;
pub mod search;
pub mod session;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{cli::Cli, export::ExportOptions};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tweet_harvest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    execute(&cli)
}

/// Authenticates, then (unless `--verify-only`) searches and exports.
///
/// Everything that can fail before the network is touched (credentials,
/// output path, encoding, query bounds) is checked first. An [`error::AuthError`]
/// is returned unwrapped so callers can tell it apart from other failures.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = config::load_settings(cli.credentials.as_deref())?;
    debug!("API base URL: {}", settings.api.api_url);

    let search = if cli.verify_only {
        None
    } else {
        let query = cli.search_query();
        query.validate()?;
        let options = ExportOptions {
            output: config::resolve_output_path(cli.output.as_deref())?,
            encoding: io_utils::resolve_encoding(cli.output_encoding.as_deref())?,
        };
        Some((query, options))
    };

    let session = session::establish(&settings.credentials, &settings.api)?;

    let Some((query, options)) = search else {
        info!(
            "Credentials verified for @{}; skipping search",
            session.account().screen_name
        );
        return Ok(());
    };

    let summary = export::fetch_and_export(&session, &query, &options)
        .with_context(|| format!("Exporting tweets to {:?}", options.output))?;
    info!(
        "Exported {} tweet(s) to {}",
        summary.rows,
        summary.path.display()
    );
    Ok(())
}
