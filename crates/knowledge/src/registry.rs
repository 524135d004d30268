//! The fixed set of departments keywords can be assigned to.

use std::collections::BTreeMap;

/// Catch-all department for ids outside [`FIXED_DEPARTMENTS`].
pub const OTHER_DEPARTMENT: &str = "Other Departments";

/// Canonical departments keyed by their public id.
pub const FIXED_DEPARTMENTS: [(i64, &str); 6] = [
    (1, "Trung tâm Ứng dụng CNTT"),
    (2, "Trung tâm Dịch vụ Hỗ trợ Đào tạo"),
    (3, "Trung tâm Thông tin - Thư viện"),
    (4, "Phòng Truyền thông"),
    (5, "Phòng Đào tạo"),
    (6, "Phòng Công tác CTCT & QLSV"),
];

/// Department name for `id`; unknown ids map to [`OTHER_DEPARTMENT`].
pub fn resolve_department(id: i64) -> &'static str {
    FIXED_DEPARTMENTS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
        .unwrap_or(OTHER_DEPARTMENT)
}

/// Id to name, ordered by id.
pub fn department_map() -> BTreeMap<i64, &'static str> {
    FIXED_DEPARTMENTS.iter().copied().collect()
}

/// Persisted column order: the fixed departments followed by the sentinel.
pub fn column_order() -> impl Iterator<Item = &'static str> {
    FIXED_DEPARTMENTS
        .iter()
        .map(|(_, name)| *name)
        .chain(std::iter::once(OTHER_DEPARTMENT))
}
