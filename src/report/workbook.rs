use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::{info, warn};

use crate::catalog::Cell;
use crate::error::ExportError;

use super::{SheetChunk, COLUMN_WIDTHS, SHEET_HEADER};

/// Serializes sheet chunks into a single XLSX file.
pub struct WorkbookWriter {
    out_path: PathBuf,
}

impl WorkbookWriter {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    /// Render the workbook in memory, then write it out in one shot.
    ///
    /// Serialization and storage failures stay distinct error cases; both
    /// fail the run, neither sends the pipeline back to retrieval.
    pub async fn write(&self, chunks: &[SheetChunk]) -> Result<(), ExportError> {
        let buffer = build_workbook(chunks)?;
        info!(
            path = %self.out_path.display(),
            bytes = buffer.len(),
            "writing workbook"
        );
        tokio::fs::write(&self.out_path, &buffer)
            .await
            .map_err(|source| ExportError::Io {
                path: self.out_path.clone(),
                source,
            })?;
        Ok(())
    }
}

/// Render chunks into XLSX bytes, one named worksheet per chunk.
///
/// A run that filtered down to nothing still yields a valid workbook with a
/// single blank sheet, since a sheetless XLSX file is not openable.
pub fn build_workbook(chunks: &[SheetChunk]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    if chunks.is_empty() {
        warn!("no rows survived filtering, writing an empty report");
        workbook.add_worksheet();
    }

    for chunk in chunks {
        info!(sheet = %chunk.name, rows = chunk.rows.len(), "adding worksheet");
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&chunk.name)?;
        write_sheet(worksheet, chunk)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(worksheet: &mut Worksheet, chunk: &SheetChunk) -> Result<(), XlsxError> {
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    for (col, label) in SHEET_HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *label)?;
    }
    for (i, entry) in chunk.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in entry.cells().enumerate() {
            // Column indices past u16 fail as a limit error, never a wrap.
            let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
            match cell {
                Cell::Number(n) => worksheet.write_number(row, col, n)?,
                Cell::Text(t) => worksheet.write_string(row, col, t)?,
            };
        }
    }
    Ok(())
}
