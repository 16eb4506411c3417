//! Conversion of a raw value grid into header-keyed records.

use indexmap::IndexMap;

/// Rows of string cells as returned by the values endpoint. The first row is the header.
pub type Grid = Vec<Vec<String>>;

/// One data row keyed by header name, in header order.
pub type Record = IndexMap<String, String>;

/// Turn every row after the header into a [`Record`].
///
/// Cells missing from the end of a short row become empty strings. When two
/// header cells carry the same name the later column's value wins, the key
/// keeping the position of its first occurrence.
pub fn to_records(grid: &[Vec<String>]) -> Vec<Record> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };

    rows.iter().map(|row| to_record(header, row)).collect()
}

fn to_record(header: &[String], row: &[String]) -> Record {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
        .collect()
}
