//! Keyword sets and the department centroids built from them.

use std::collections::BTreeMap;

use semantic::{Embedder, EmbeddingVector};
use serde::{Deserialize, Serialize};
use tabular::Grid;

use crate::error::ClassifyError;

/// Departments mapped to their keywords.
///
/// Department names are trimmed and lowercased on insert so that
/// `"Phòng Đào Tạo "` and `"phòng đào tạo"` are the same department.
/// Iteration order is by department name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet {
    departments: BTreeMap<String, Vec<String>>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a department label the way keyword sets store it.
    pub fn normalize_department(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Add keywords for a department, appending to any it already has.
    /// Blank keywords are dropped; a blank department name is ignored.
    pub fn insert<I, S>(&mut self, department: &str, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let department = Self::normalize_department(department);
        if department.is_empty() {
            return;
        }
        let entry = self.departments.entry(department).or_default();
        entry.extend(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty()),
        );
    }

    pub fn keywords(&self, department: &str) -> Option<&[String]> {
        self.departments
            .get(&Self::normalize_department(department))
            .map(Vec::as_slice)
    }

    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.departments.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.departments
            .iter()
            .map(|(d, k)| (d.as_str(), k.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    /// Content hash used to tell whether a cached profile is still current.
    pub fn fingerprint(&self) -> u64 {
        fxhash::hash64(&self.departments)
    }

    /// Read a keyword table: every column header is a department and the
    /// non-blank cells below it are its keywords.
    ///
    /// With `drop_first_data_row`, the first non-blank cell of each column
    /// is discarded before the rest are kept.
    pub fn from_grid(grid: &Grid, drop_first_data_row: bool) -> Self {
        let mut set = KeywordSet::new();
        for (idx, header) in grid.headers().iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let cells = grid
                .column(idx)
                .filter(|cell| !cell.trim().is_empty())
                .skip(usize::from(drop_first_data_row));
            set.insert(header, cells);
        }
        set
    }
}

impl<D, K, S> FromIterator<(D, K)> for KeywordSet
where
    D: AsRef<str>,
    K: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (D, K)>>(iter: T) -> Self {
        let mut set = KeywordSet::new();
        for (department, keywords) in iter {
            set.insert(department.as_ref(), keywords);
        }
        set
    }
}

/// One centroid vector per department, all of the embedder's width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentProfile {
    centroids: BTreeMap<String, EmbeddingVector>,
    dim: usize,
    fingerprint: u64,
}

impl DepartmentProfile {
    /// Embed every department's keywords (joined by spaces) and mean-pool
    /// the token rows into that department's centroid.
    ///
    /// A department with no keywords gets an all-zero centroid, which scores
    /// 0.0 against any text.
    pub fn build(embedder: &Embedder, keywords: &KeywordSet) -> Result<Self, ClassifyError> {
        let dim = embedder.hidden_size();
        let mut centroids = BTreeMap::new();

        for (department, words) in keywords.iter() {
            let centroid = if words.is_empty() {
                tracing::warn!(department, "department has no keywords, using zero centroid");
                EmbeddingVector::zeros(dim)
            } else {
                embedder.embed_pooled(&words.join(" "))?
            };
            centroids.insert(department.to_string(), centroid);
        }

        tracing::debug!(
            departments = centroids.len(),
            dim,
            "built department profile"
        );

        Ok(Self {
            centroids,
            dim,
            fingerprint: keywords.fingerprint(),
        })
    }

    pub fn centroid(&self, department: &str) -> Option<&EmbeddingVector> {
        self.centroids
            .get(&KeywordSet::normalize_department(department))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmbeddingVector)> {
        self.centroids.iter().map(|(d, v)| (d.as_str(), v))
    }

    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.centroids.keys().map(String::as_str)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Fingerprint of the keyword set this profile was built from.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semantic::{StubEncoder, WhitespaceSegmenter};

    fn stub_embedder(dim: usize) -> Embedder {
        Embedder::with_parts(
            Box::new(WhitespaceSegmenter),
            Box::new(StubEncoder::new(dim, 64)),
            dim,
        )
    }

    #[test]
    fn keyword_set_normalizes_department_names() {
        let mut set = KeywordSet::new();
        set.insert(" Phòng Đào Tạo ", ["tuyển sinh"]);
        set.insert("phòng đào tạo", ["học phí", "  "]);

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.keywords("PHÒNG ĐÀO TẠO").unwrap(),
            &["tuyển sinh".to_string(), "học phí".to_string()]
        );
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a: KeywordSet = [("a", vec!["x", "y"])].into_iter().collect();
        let b: KeywordSet = [("A", vec!["x", "y"])].into_iter().collect();
        let c: KeywordSet = [("a", vec!["x", "z"])].into_iter().collect();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn from_grid_reads_columns() {
        let grid = Grid::new(
            vec!["Phòng Đào tạo".into(), " Phòng Truyền thông ".into(), "".into()],
            vec![
                vec!["tuyển sinh".into(), "sự kiện".into(), "ignored".into()],
                vec!["học phí".into(), "".into(), "".into()],
                vec!["".into(), "báo chí".into(), "".into()],
            ],
        );
        let set = KeywordSet::from_grid(&grid, false);

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.keywords("phòng đào tạo").unwrap(),
            &["tuyển sinh".to_string(), "học phí".to_string()]
        );
        assert_eq!(
            set.keywords("phòng truyền thông").unwrap(),
            &["sự kiện".to_string(), "báo chí".to_string()]
        );
    }

    #[test]
    fn from_grid_can_drop_first_data_row() {
        let grid = Grid::new(
            vec!["a".into(), "b".into()],
            vec![
                vec!["sub-header".into(), "".into()],
                vec!["k1".into(), "sub-header".into()],
                vec!["k2".into(), "k3".into()],
            ],
        );
        let set = KeywordSet::from_grid(&grid, true);
        assert_eq!(set.keywords("a").unwrap(), &["k1".to_string(), "k2".to_string()]);
        assert_eq!(set.keywords("b").unwrap(), &["k3".to_string()]);
    }

    #[test]
    fn build_produces_one_centroid_per_department() {
        let embedder = stub_embedder(16);
        let set: KeywordSet = [
            ("phòng đào tạo", vec!["tuyển sinh", "học phí"]),
            ("phòng truyền thông", vec!["sự kiện"]),
        ]
        .into_iter()
        .collect();

        let profile = DepartmentProfile::build(&embedder, &set).unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.dim(), 16);
        assert_eq!(profile.fingerprint(), set.fingerprint());
        for (_, centroid) in profile.iter() {
            assert_eq!(centroid.dim(), 16);
            assert!(!centroid.is_zero());
        }
    }

    #[test]
    fn department_without_keywords_gets_zero_centroid() {
        let embedder = stub_embedder(8);
        let mut set = KeywordSet::new();
        set.insert("empty", Vec::<String>::new());

        let profile = DepartmentProfile::build(&embedder, &set).unwrap();
        let centroid = profile.centroid("empty").unwrap();
        assert_eq!(centroid.dim(), 8);
        assert!(centroid.is_zero());
    }

    #[test]
    fn empty_keyword_set_builds_empty_profile() {
        let profile = DepartmentProfile::build(&stub_embedder(8), &KeywordSet::new()).unwrap();
        assert!(profile.is_empty());
    }
}
