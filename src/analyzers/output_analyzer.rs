use crate::error::{ProcessingError, Result};
use crate::utils::constants::NOT_AVAILABLE;
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputStatistics {
    pub total_rows: usize,
    pub missing_values: usize,
    pub malformed_lines: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Row count per `region/parameter`
    pub rows_per_series: BTreeMap<String, usize>,
}

impl OutputStatistics {
    pub fn missing_percentage(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        (self.missing_values as f64 / self.total_rows as f64) * 100.0
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Output Statistics\n");
        summary.push_str("=================\n");
        summary.push_str(&format!("Rows: {}\n", self.total_rows));
        summary.push_str(&format!(
            "Missing values: {} ({:.1}%)\n",
            self.missing_values,
            self.missing_percentage()
        ));
        if let (Some(first), Some(last)) = (self.first_year, self.last_year) {
            summary.push_str(&format!("Years: {} - {}\n", first, last));
        }
        if self.malformed_lines > 0 {
            summary.push_str(&format!("Malformed lines: {}\n", self.malformed_lines));
        }

        summary.push_str(&format!("\nSeries ({}):\n", self.rows_per_series.len()));
        for (series, rows) in &self.rows_per_series {
            summary.push_str(&format!("  {:<20} {:>8}\n", series, rows));
        }

        summary
    }
}

/// Reads back a flattened output file and summarises what it holds.
pub struct OutputAnalyzer;

impl OutputAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, path: &Path) -> Result<OutputStatistics> {
        if !path.exists() {
            return Err(ProcessingError::Config(format!(
                "Output file not found: {}",
                path.display()
            )));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(path)?;

        let mut stats = OutputStatistics::default();

        for record in reader.records() {
            let record = record?;
            // region, parameter, year, key, value and the empty trailing field
            let (Some(region), Some(parameter), Some(year), Some(_key), Some(value)) = (
                record.get(0),
                record.get(1),
                record.get(2),
                record.get(3),
                record.get(4),
            ) else {
                stats.malformed_lines += 1;
                continue;
            };

            stats.total_rows += 1;
            if value == NOT_AVAILABLE {
                stats.missing_values += 1;
            }
            if let Ok(year) = year.trim().parse::<i32>() {
                stats.first_year = Some(stats.first_year.map_or(year, |y| y.min(year)));
                stats.last_year = Some(stats.last_year.map_or(year, |y| y.max(year)));
            }
            *stats
                .rows_per_series
                .entry(format!("{}/{}", region, parameter))
                .or_default() += 1;
        }

        Ok(stats)
    }
}

impl Default for OutputAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
