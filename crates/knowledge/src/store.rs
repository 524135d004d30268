use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tabular::{read_grid_from_path, write_grid_atomic, Grid, OutputFormat};

use crate::registry::{column_order, resolve_department};
use crate::KnowledgeError;

/// Result of [`KnowledgeBase::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddOutcome {
    Added { keyword: String, department: String },
    AlreadyExists { keyword: String, department: String },
}

impl AddOutcome {
    /// Human-readable outcome returned to API callers.
    pub fn message(&self) -> String {
        match self {
            AddOutcome::Added {
                keyword,
                department,
            } => format!("Keyword '{keyword}' added to department '{department}'."),
            AddOutcome::AlreadyExists {
                keyword,
                department,
            } => format!("Keyword '{keyword}' already exists in department '{department}'."),
        }
    }

    pub fn department(&self) -> &str {
        match self {
            AddOutcome::Added { department, .. } | AddOutcome::AlreadyExists { department, .. } => {
                department
            }
        }
    }
}

/// Keyword-to-department lookup table.
///
/// Keys are trimmed and lowercased. When backed by a file, every successful
/// insert rewrites the whole file (temp file then rename) while holding the
/// write lock, so concurrent adds are serialized. The file is kept in the
/// format its extension names: `.xlsx` stays a workbook, anything else is CSV.
#[derive(Debug)]
pub struct KnowledgeBase {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl KnowledgeBase {
    /// Load from `path`. A missing file yields an empty base that will be created on first add.
    ///
    /// Paths that could be read but never written back (`.xls`, `.ods`, ...) are refused.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, KnowledgeError> {
        let path = path.into();
        OutputFormat::for_path(&path).map_err(KnowledgeError::Load)?;
        let entries = if path.exists() {
            let grid = read_grid_from_path(&path).map_err(KnowledgeError::Load)?;
            entries_from_grid(&grid)
        } else {
            tracing::info!(path = %path.display(), "knowledge base file absent, starting empty");
            BTreeMap::new()
        };

        tracing::info!(
            path = %path.display(),
            keywords = entries.len(),
            "knowledge base loaded"
        );

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    /// Volatile base that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Case-insensitive exact match. Returns `(normalized keyword, department)`.
    pub fn lookup(&self, keyword: &str) -> Result<(String, String), KnowledgeError> {
        let key = normalize_keyword(keyword);
        let department = self.read().get(&key).cloned();
        match department {
            Some(department) => Ok((key, department)),
            None => Err(KnowledgeError::NotFound(key)),
        }
    }

    /// Insert `keyword` under the department with `department_id` unless it already exists.
    ///
    /// Unknown ids map to the "Other Departments" sentinel. An existing keyword is left
    /// untouched and its current department reported. If persisting fails the insert is
    /// rolled back.
    pub fn add(&self, keyword: &str, department_id: i64) -> Result<AddOutcome, KnowledgeError> {
        let key = normalize_keyword(keyword);
        if key.is_empty() {
            return Err(KnowledgeError::EmptyKeyword);
        }
        let department = resolve_department(department_id).to_string();

        let mut entries = self.write();
        if let Some(existing) = entries.get(&key) {
            return Ok(AddOutcome::AlreadyExists {
                keyword: key,
                department: existing.clone(),
            });
        }

        entries.insert(key.clone(), department.clone());
        if let Some(path) = &self.path {
            if let Err(err) = write_grid_atomic(path, &grid_from_entries(&entries)) {
                entries.remove(&key);
                tracing::error!(keyword = %key, error = %err, "knowledge base persist failed");
                return Err(KnowledgeError::Persist(err));
            }
        }

        tracing::info!(keyword = %key, department = %department, "keyword added");
        Ok(AddOutcome::Added {
            keyword: key,
            department,
        })
    }

    /// Snapshot of the full mapping.
    pub fn list(&self) -> BTreeMap<String, String> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Each column header is a department, each non-blank cell below it a keyword.
fn entries_from_grid(grid: &Grid) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for (header, cells) in grid.columns() {
        let department = header.trim();
        if department.is_empty() {
            continue;
        }
        for cell in cells {
            let key = normalize_keyword(cell);
            if !key.is_empty() {
                entries.insert(key, department.to_string());
            }
        }
    }
    entries
}

/// Fixed department columns first, then any other department present in `entries`.
fn grid_from_entries(entries: &BTreeMap<String, String>) -> Grid {
    let mut columns: Vec<(String, Vec<String>)> = column_order()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();

    for (keyword, department) in entries {
        match columns.iter_mut().find(|(name, _)| name == department) {
            Some((_, keywords)) => keywords.push(keyword.clone()),
            None => columns.push((department.clone(), vec![keyword.clone()])),
        }
    }

    Grid::from_columns(columns)
}
