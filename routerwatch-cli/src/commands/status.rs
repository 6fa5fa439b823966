//! System status command.

use std::fmt::Write as _;
use std::path::Path;

use routerwatch_core::monitoring::{MetricKey, SystemSnapshot};
use serde::Serialize;

use crate::cli::{OutputFormat, RouterArgs};
use crate::error::CliError;
use crate::util::{monitor_params, to_json};

/// Status command handler
pub fn cmd_status(
    config_path: Option<&Path>,
    router: &RouterArgs,
    format: OutputFormat,
) -> Result<(), CliError> {
    let params = monitor_params(config_path, router)?;
    let snapshot = super::poll_once(&params)?;
    let host = params.endpoint.address();

    match format {
        OutputFormat::Table => println!("{}", format_table(&host, &snapshot)),
        OutputFormat::Json => println!("{}", format_json(&host, &snapshot)?),
    }

    Ok(())
}

/// Format the fixed metrics of a snapshot as a two-column table
#[must_use]
pub fn format_table(host: &str, snapshot: &SystemSnapshot) -> String {
    let rows: Vec<(String, String)> = MetricKey::FIXED
        .iter()
        .filter_map(|key| {
            let value = snapshot.value(key)?;
            let text = match key.unit() {
                Some(unit) => format!("{value} {unit}"),
                None => value.to_string(),
            };
            Some((key.display_name(), text))
        })
        .collect();

    let label_width = rows
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    let _ = writeln!(output, "Router {host}\n");
    let _ = writeln!(output, "{:<label_width$}  VALUE", "METRIC");
    let _ = writeln!(output, "{:-<label_width$}  {:-<5}", "", "");
    for (label, value) in rows {
        let _ = writeln!(output, "{label:<label_width$}  {value}");
    }
    let _ = write!(
        output,
        "{:<label_width$}  {}",
        "Interfaces",
        snapshot.interfaces.len()
    );

    output
}

/// Status output for JSON
#[derive(Debug, Serialize)]
struct StatusOutput<'a> {
    host: &'a str,
    #[serde(flatten)]
    snapshot: &'a SystemSnapshot,
}

/// Format a snapshot as JSON
///
/// # Errors
///
/// Returns `CliError::Output` if JSON serialization fails.
pub fn format_json(host: &str, snapshot: &SystemSnapshot) -> Result<String, CliError> {
    to_json(&StatusOutput { host, snapshot })
}
