//! Result reporting: tab-separated summary table plus a JSON snapshot.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::stats::SummaryRow;

/// Write the tab-separated summary table, one row per budget level.
///
/// Failure to open or write the file is fatal for the experiment driver;
/// the caller reports it to the operator.
pub fn write_table(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("opening output file {}", path.display()))?;

    writeln!(
        file,
        "simulations\truns\tundiscounted_mean\tundiscounted_se\tdiscounted_mean\tdiscounted_se\tmean_duration_secs"
    )?;
    for row in rows {
        writeln!(
            file,
            "{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
            row.simulations,
            row.runs,
            row.undiscounted_mean,
            row.undiscounted_se,
            row.discounted_mean,
            row.discounted_se,
            row.mean_duration_secs,
        )?;
    }

    info!(path = %path.display(), rows = rows.len(), "summary table written");
    Ok(())
}

/// Write the same rows as JSON next to the table (write-to-temp-then-rename,
/// atomic on most filesystems).
pub fn write_json_snapshot(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).context("serializing summary rows")?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json.as_bytes())
        .with_context(|| format!("writing {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("renaming into {}", path.display()))?;

    info!(path = %path.display(), "JSON snapshot written");
    Ok(())
}
