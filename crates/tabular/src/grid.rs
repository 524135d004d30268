use serde::Serialize;

/// A header row plus data rows, every row padded or truncated to the header width.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Build a grid, widening the header to the longest row and squaring off the rest.
    pub fn new(mut headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        align_row_lengths(&mut headers, &mut rows);
        Self { headers, rows }
    }

    /// Build a grid from named columns of possibly different lengths.
    /// Shorter columns are padded with empty cells.
    pub fn from_columns<H, C>(columns: Vec<(H, Vec<C>)>) -> Self
    where
        H: Into<String>,
        C: Into<String>,
    {
        let height = columns.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        let width = columns.len();
        let mut headers = Vec::with_capacity(width);
        let mut rows = vec![vec![String::new(); width]; height];
        for (col, (header, cells)) in columns.into_iter().enumerate() {
            headers.push(header.into());
            for (row, cell) in cells.into_iter().enumerate() {
                rows[row][col] = cell.into();
            }
        }
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column whose header equals `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// All cells of column `idx`, top to bottom, blanks included.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(idx).map(String::as_str))
    }

    /// `(header, cells)` for each column, left to right.
    pub fn columns(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.headers
            .iter()
            .enumerate()
            .map(move |(idx, header)| (header.as_str(), self.column(idx).collect()))
    }
}

fn align_row_lengths(headers: &mut Vec<String>, rows: &mut [Vec<String>]) {
    let column_count = rows
        .iter()
        .map(Vec::len)
        .fold(headers.len(), usize::max);

    if headers.len() < column_count {
        headers.resize(column_count, String::new());
    }

    for row in rows.iter_mut() {
        row.resize(column_count, String::new());
    }
}
