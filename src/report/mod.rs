//! Report rendering
//!
//! Turns collected category data into on-disk artifacts: one JSON report
//! holding everything, plus per-category CSV sheets with flattened
//! columns.

mod flatten;
mod writer;

pub use flatten::{cell_text, field_names, flatten_record, flatten_records};
pub use writer::ReportWriter;

use crate::error::Result;
use crate::types::Record;
use std::path::PathBuf;

/// Category name to record sequence, in report order.
pub type ReportData = Vec<(String, Vec<Record>)>;

/// Paths of the artifacts one report run produced.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    /// The combined JSON report
    pub json: PathBuf,
    /// One CSV sheet per category
    pub sheets: Vec<PathBuf>,
}

/// Write the JSON report and every category sheet.
pub fn save_reports(
    data: &ReportData,
    output_dir: impl Into<PathBuf>,
    prefix: impl Into<String>,
) -> Result<ReportPaths> {
    let writer = ReportWriter::new(output_dir, prefix);
    let json = writer.write_json(data)?;
    let sheets = writer.write_sheets(data)?;
    Ok(ReportPaths { json, sheets })
}
