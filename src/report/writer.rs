//! Report file writers
//!
//! One pretty-printed JSON report with every category, plus one CSV
//! sheet per category with the flattened header union.

use super::flatten::{cell_text, field_names, flatten_records};
use crate::error::{Error, Result};
use crate::types::Record;
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes report artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    prefix: String,
}

impl ReportWriter {
    /// Create a writer; the directory is created on the first write.
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| Error::report(format!("Failed to create output directory: {e}")))
    }

    /// Write the full JSON report: a map of category name to records.
    pub fn write_json(&self, data: &[(String, Vec<Record>)]) -> Result<PathBuf> {
        self.ensure_dir()?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self
            .output_dir
            .join(format!("{}_{timestamp}_report.json", self.prefix));

        let mut map = serde_json::Map::new();
        for (name, records) in data {
            map.insert(name.clone(), serde_json::Value::Array(records.clone()));
        }

        info!("Saving JSON report to: {}", path.display());
        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, &serde_json::Value::Object(map))?;
        Ok(path)
    }

    /// Write one CSV sheet per category.
    pub fn write_sheets(&self, data: &[(String, Vec<Record>)]) -> Result<Vec<PathBuf>> {
        self.ensure_dir()?;

        let mut paths = Vec::with_capacity(data.len());
        for (name, records) in data {
            let path = self.output_dir.join(format!("{}_{name}.csv", self.prefix));
            info!("Saving {name} sheet to: {}", path.display());
            write_sheet(&path, records)?;
            paths.push(path);
        }
        Ok(paths)
    }
}

/// Write one sheet: header row of the flattened field union, then one
/// row per record with empty cells where a field is absent.
fn write_sheet(path: &Path, records: &[Record]) -> Result<()> {
    let rows = flatten_records(records);
    let headers = field_names(&rows);

    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", format_row(headers.iter().map(String::as_str)))?;

    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| cell_text(row.get(header)))
            .collect();
        writeln!(file, "{}", format_row(cells.iter().map(String::as_str)))?;
    }
    Ok(())
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(csv_escape).collect::<Vec<_>>().join(",")
}

/// Quote a field when it contains a delimiter, quote or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod writer_tests {
    use super::*;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }
}
