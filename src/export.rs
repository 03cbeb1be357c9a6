use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    io_utils,
    record::{self, COLUMNS, ResultRecord},
    search::SearchQuery,
    session::Session,
};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output: PathBuf,
    pub encoding: &'static Encoding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Runs the search once and writes every matched tweet to `options.output`.
pub fn fetch_and_export(
    session: &Session,
    query: &SearchQuery,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    query.validate()?;
    info!(
        "Retrieving up to {} {} tweet(s) for query '{}'",
        query.count,
        query.result_type.as_str(),
        query.query
    );
    let response = session
        .client()
        .search_tweets(query)
        .context("Searching tweets")?;
    if let Some(meta) = &response.search_metadata {
        debug!(
            "Search metadata: count={:?} max_id={:?} completed_in={:?}",
            meta.count, meta.max_id, meta.completed_in
        );
    }

    let records = record::project(&response.statuses).context("Reading search results")?;
    let rows = write_records(&options.output, options.encoding, &records)?;
    info!("Output file located: {}", options.output.display());
    Ok(ExportSummary {
        path: options.output.clone(),
        rows,
    })
}

/// Writes the header plus one row per record. Returns the number of data rows.
pub fn write_records(
    path: &Path,
    encoding: &'static Encoding,
    records: &[ResultRecord],
) -> Result<usize> {
    let mut writer = io_utils::open_export_writer(path, encoding)?;
    io_utils::write_row(&mut writer, COLUMNS)
        .with_context(|| format!("Writing header to {path:?}"))?;
    for record in records {
        io_utils::write_row(&mut writer, record.to_row())
            .with_context(|| format!("Writing tweet {} to {path:?}", record.tweet_id))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing output file {path:?}"))?;
    info!("Wrote {} data row(s) to {path:?}", records.len());
    Ok(records.len())
}
