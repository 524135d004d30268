use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::Workbook;
use tempfile::NamedTempFile;

use crate::{Grid, TabularError};

/// Layouts a grid can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

impl OutputFormat {
    /// Format named by the extension of `path`. Anything that is not a
    /// workbook is written as CSV; workbook flavours other than `.xlsx`
    /// cannot be produced and are rejected.
    pub fn for_path(path: &Path) -> Result<Self, TabularError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("xlsx") => Ok(OutputFormat::Xlsx),
            Some(other @ ("xlsm" | "xlsb" | "xls" | "ods")) => {
                Err(TabularError::UnsupportedFormat(format!(
                    "cannot write .{other} files, use .xlsx or .csv"
                )))
            }
            _ => Ok(OutputFormat::Csv),
        }
    }
}

/// Serialize `grid` as CSV (header row first) into `writer`.
pub fn write_csv<W: Write>(grid: &Grid, writer: W) -> Result<(), TabularError> {
    let mut out = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    out.write_record(grid.headers())?;
    for row in grid.rows() {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Single-sheet `.xlsx` image of `grid`. Blank cells are left empty.
pub fn xlsx_bytes(grid: &Grid) -> Result<Vec<u8>, TabularError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let rows = std::iter::once(grid.headers()).chain(grid.rows().iter().map(Vec::as_slice));
    for (row_index, row) in rows.enumerate() {
        let row_index = u32::try_from(row_index)
            .map_err(|_| TabularError::Workbook("too many rows for a worksheet".into()))?;
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col_index = u16::try_from(col_index)
                .map_err(|_| TabularError::Workbook("too many columns for a worksheet".into()))?;
            sheet.write_string(row_index, col_index, value.as_str())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Replace `path` with the CSV form of `grid`.
pub fn write_csv_atomic(path: &Path, grid: &Grid) -> Result<(), TabularError> {
    replace_file(path, |file| write_csv(grid, file))?;
    tracing::debug!(path = %path.display(), rows = grid.rows().len(), "wrote csv grid");
    Ok(())
}

/// Replace `path` with `grid` in the format its extension names.
pub fn write_grid_atomic(path: &Path, grid: &Grid) -> Result<(), TabularError> {
    match OutputFormat::for_path(path)? {
        OutputFormat::Csv => write_csv_atomic(path, grid),
        OutputFormat::Xlsx => {
            let bytes = xlsx_bytes(grid)?;
            replace_file(path, |file| Ok(file.write_all(&bytes)?))?;
            tracing::debug!(path = %path.display(), rows = grid.rows().len(), "wrote xlsx grid");
            Ok(())
        }
    }
}

/// Write through a temporary file in the target directory, then rename it
/// over `path`, so readers never observe a half-written file.
fn replace_file<F>(path: &Path, fill: F) -> Result<(), TabularError>
where
    F: FnOnce(&mut std::fs::File) -> Result<(), TabularError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_csv, read_grid_from_path, read_workbook};

    #[test]
    fn csv_roundtrip_preserves_cells() {
        let grid = Grid::from_columns(vec![
            ("Phòng Đào tạo", vec!["tuyển sinh", "học phí, lệ phí"]),
            ("Phòng Truyền thông", vec!["báo chí"]),
        ]);
        let mut buf = Vec::new();
        write_csv(&grid, &mut buf).unwrap();
        let back = read_csv(&buf).unwrap();
        assert_eq!(back.headers(), grid.headers());
        assert_eq!(back.column(0).collect::<Vec<_>>(), vec!["tuyển sinh", "học phí, lệ phí"]);
        assert_eq!(back.column(1).collect::<Vec<_>>(), vec!["báo chí", ""]);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, "stale").unwrap();

        let grid = Grid::from_columns(vec![("A", vec!["x"])]);
        write_csv_atomic(&path, &grid).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A\nx\n");
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn atomic_write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/results.csv");
        write_csv_atomic(&path, &Grid::from_columns(vec![("text", vec!["hi"])])).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(OutputFormat::for_path(Path::new("kb.XLSX")).unwrap(), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::for_path(Path::new("kb.csv")).unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::for_path(Path::new("kb")).unwrap(), OutputFormat::Csv);
        assert!(matches!(
            OutputFormat::for_path(Path::new("kb.ods")),
            Err(TabularError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn xlsx_path_is_written_as_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledgebase.xlsx");
        let grid = Grid::from_columns(vec![
            ("Phòng Đào tạo", vec!["tuyển sinh", "học phí"]),
            ("Phòng Truyền thông", vec!["báo chí"]),
        ]);

        write_grid_atomic(&path, &grid).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK\x03\x04"));

        let back = read_grid_from_path(&path).unwrap();
        assert_eq!(back.headers(), grid.headers());
        assert_eq!(back.column(0).collect::<Vec<_>>(), vec!["tuyển sinh", "học phí"]);
        assert_eq!(back.column(1).collect::<Vec<_>>(), vec!["báo chí", ""]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn xlsx_bytes_read_back_in_memory() {
        let grid = Grid::new(vec!["text".into()], vec![vec!["Xin chào".into()]]);
        let back = read_workbook(&xlsx_bytes(&grid).unwrap()).unwrap();
        assert_eq!(back.rows(), grid.rows());
    }
}
