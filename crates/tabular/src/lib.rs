//! Tabular file I/O.
//!
//! Everything here speaks one shape: a header row followed by data rows of
//! trimmed string cells ([`Grid`]). Readers accept CSV and spreadsheet
//! workbooks (first sheet only). Writers emit CSV or `.xlsx`, chosen by the
//! target extension, through an atomic temp-file-then-rename replace.

mod error;
mod grid;
mod read;
mod write;

pub use crate::error::TabularError;
pub use crate::grid::Grid;
pub use crate::read::{read_csv, read_grid, read_grid_from_path, read_workbook, TabularFormat};
pub use crate::write::{write_csv, write_csv_atomic, write_grid_atomic, xlsx_bytes, OutputFormat};
