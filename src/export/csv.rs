//! CSV export of the statistics summary.
//!
//! Layout: a `Metric,Value` table with the status counts (plus the check
//! interval and active provider count when reported). Then, each after a
//! blank row and only when present, a `Provider,Listings` table and a
//! `Date,Clean,Blacklisted` history table.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::io::{self, Write};
use std::path::Path;

use crate::api::Stats;

/// Writes `stats` as CSV to `writer`. Returns the number of data rows.
pub fn write_stats_csv<W: Write>(stats: &Stats, writer: W) -> Result<usize> {
    // The history table is wider than the others.
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
    let mut rows = 0;

    writer.write_record(["Metric", "Value"])?;
    for (metric, value) in [
        ("Total IPs", stats.total),
        ("Clean", stats.clean),
        ("Blacklisted", stats.blacklisted),
        ("Pending", stats.pending),
    ] {
        writer.write_record([metric, value.to_string().as_str()])?;
        rows += 1;
    }
    if let Some(interval) = &stats.check_interval {
        writer.write_record(["Check Interval", interval.as_str()])?;
        rows += 1;
    }
    if let Some(active) = stats.active_providers {
        writer.write_record(["Active Providers", active.to_string().as_str()])?;
        rows += 1;
    }

    if !stats.providers.is_empty() {
        writer.write_record(["", ""])?;
        writer.write_record(["Provider", "Listings"])?;
        for provider in &stats.providers {
            writer.write_record([provider.name.as_str(), provider.count.to_string().as_str()])?;
            rows += 1;
        }
    }

    if !stats.history.is_empty() {
        writer.write_record(["", ""])?;
        writer.write_record(["Date", "Clean", "Blacklisted"])?;
        for point in &stats.history {
            writer.write_record([
                point.date.as_str(),
                point.clean.to_string().as_str(),
                point.blacklisted.to_string().as_str(),
            ])?;
            rows += 1;
        }
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(rows)
}

/// Exports `stats` to `output`, or to stdout when `output` is `None`.
pub fn export_stats_csv(stats: &Stats, output: Option<&Path>) -> Result<usize> {
    // Use trait object to handle both File and Stdout
    let sink: Box<dyn Write> = match output {
        Some(path) => {
            let file = std::fs::File::create(path).context(format!(
                "Failed to create output file: {}",
                path.display()
            ))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };
    write_stats_csv(stats, sink)
}

/// Default file name for an export made today, e.g. `blacklist-stats-2024-05-01.csv`.
pub fn default_stats_filename() -> String {
    format!(
        "blacklist-stats-{}.csv",
        chrono::Local::now().format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ProviderListing, StatsHistoryPoint};

    #[test]
    fn test_stats_csv_layout() {
        let stats = Stats {
            total: 148,
            clean: 140,
            blacklisted: 6,
            pending: 2,
            providers: vec![
                ProviderListing {
                    name: "Spamhaus ZEN".to_string(),
                    count: 3,
                },
                ProviderListing {
                    name: "Barracuda".to_string(),
                    count: 2,
                },
            ],
            ..Stats::default()
        };

        let mut out = Vec::new();
        let rows = write_stats_csv(&stats, &mut out).unwrap();
        assert_eq!(rows, 6);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Metric,Value\nTotal IPs,148\nClean,140\nBlacklisted,6\nPending,2\n,\n\
             Provider,Listings\nSpamhaus ZEN,3\nBarracuda,2\n"
        );
    }

    #[test]
    fn test_stats_csv_dashboard_fields_and_history() {
        let stats = Stats {
            total: 2,
            clean: 2,
            check_interval: Some("6h".to_string()),
            active_providers: Some(12),
            history: vec![StatsHistoryPoint {
                date: "2024-05-01".to_string(),
                clean: 2,
                blacklisted: 1,
            }],
            ..Stats::default()
        };

        let mut out = Vec::new();
        let rows = write_stats_csv(&stats, &mut out).unwrap();
        assert_eq!(rows, 7);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Metric,Value\nTotal IPs,2\nClean,2\nBlacklisted,0\nPending,0\n\
             Check Interval,6h\nActive Providers,12\n,\n\
             Date,Clean,Blacklisted\n2024-05-01,2,1\n"
        );
    }

    #[test]
    fn test_stats_csv_without_providers() {
        let mut out = Vec::new();
        write_stats_csv(&Stats::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Metric,Value\nTotal IPs,0\n"));
        assert!(!text.contains("Provider"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_stats_filename());
        export_stats_csv(&Stats::default(), Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_default_filename_shape() {
        let name = default_stats_filename();
        assert!(name.starts_with("blacklist-stats-"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "blacklist-stats-YYYY-MM-DD.csv".len());
    }
}
