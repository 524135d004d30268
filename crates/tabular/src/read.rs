use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::{Grid, TabularError};

/// On-disk layouts the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    /// Any spreadsheet workbook calamine can open (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
}

impl TabularFormat {
    /// Pick a format from the file name extension, falling back to content sniffing:
    /// zip (`PK`) and OLE2 signatures mean a workbook, anything else is read as CSV.
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> Self {
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => TabularFormat::Workbook,
            Some("csv" | "tsv" | "txt") => TabularFormat::Csv,
            _ if bytes.starts_with(b"PK\x03\x04")
                || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) =>
            {
                TabularFormat::Workbook
            }
            _ => TabularFormat::Csv,
        }
    }
}

/// Parse `bytes` as a grid whose first row is the header.
pub fn read_grid(bytes: &[u8], format: TabularFormat) -> Result<Grid, TabularError> {
    match format {
        TabularFormat::Csv => read_csv(bytes),
        TabularFormat::Workbook => read_workbook(bytes),
    }
}

/// Read a grid from disk, choosing the format by extension.
pub fn read_grid_from_path(path: &Path) -> Result<Grid, TabularError> {
    let bytes = fs::read(path)?;
    let name = path.file_name().and_then(|name| name.to_str());
    read_grid(&bytes, TabularFormat::detect(name, &bytes))
}

/// Comma-separated text with a header row. Blank rows are skipped.
pub fn read_csv(bytes: &[u8]) -> Result<Grid, TabularError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(strip_bom(bytes));

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|value| value.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(TabularError::EmptySheet);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values: Vec<String> = record
            .iter()
            .map(|value| value.trim().to_string())
            .collect();
        if values.iter().all(String::is_empty) {
            continue;
        }
        rows.push(values);
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "read csv grid");
    Ok(Grid::new(headers, rows))
}

/// First worksheet of a spreadsheet workbook. Blank rows are skipped.
pub fn read_workbook(bytes: &[u8]) -> Result<Grid, TabularError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TabularError::Workbook("the workbook has no worksheets".into()))?;

    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or(TabularError::EmptySheet)?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        let values: Vec<String> = row.iter().map(cell_to_string).collect();
        if values.iter().all(String::is_empty) {
            continue;
        }
        rows.push(values);
    }

    tracing::debug!(
        sheet = %sheet_name,
        columns = headers.len(),
        rows = rows.len(),
        "read workbook grid"
    );
    Ok(Grid::new(headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string().trim().to_string(),
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
