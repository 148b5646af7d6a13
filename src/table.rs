//! Column-major table model.
//!
//! A [`Table`] holds uniquely named, typed columns that all share the same
//! row count. Missing values are tracked per column with a bit-packed
//! [`ValidityBitmap`]; the dense value vectors hold a placeholder at null
//! positions that must be ignored.
//!
//! # Column Kinds
//!
//! | Kind | Storage | Analyzed as |
//! |------|---------|-------------|
//! | [`Numeric`](Column::Numeric) | `Vec<f64>` + bitmap | descriptive stats, outliers, correlation |
//! | [`Text`](Column::Text) | `Vec<String>` + bitmap | frequency and character profile |
//! | [`Boolean`](Column::Boolean) | `Vec<bool>` + bitmap | true/false counts |
//! | [`Datetime`](Column::Datetime) | `Vec<NaiveDateTime>` + bitmap | earliest/latest |
//! | [`Other`](Column::Other) | rendered `Vec<String>` + bitmap | counted only |
//!
//! # Example
//!
//! ```
//! use u_report::table::{Column, Table};
//!
//! let table = Table::from_columns(vec![
//!     ("id", Column::numeric_from([Some(1.0), Some(2.0), None])),
//!     ("name", Column::text_from([Some("a"), Some("b"), Some("c")])),
//! ])
//! .unwrap();
//! assert_eq!(table.row_count(), 3);
//! assert_eq!(table.column_count(), 2);
//! assert_eq!(table.total_null_count(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::error::ReportError;

// ── ValidityBitmap ────────────────────────────────────────────────────

/// Bit-packed validity bitmap, one bit per row (1 = present, 0 = null).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityBitmap {
    bits: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Creates a bitmap where all `len` positions are valid.
    pub fn all_valid(len: usize) -> Self {
        let words = len.div_ceil(64);
        let mut bits = vec![u64::MAX; words];
        let tail = len % 64;
        if tail != 0 {
            if let Some(last) = bits.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        Self { bits, len }
    }

    /// Creates an empty bitmap.
    pub fn empty() -> Self {
        Self {
            bits: Vec::new(),
            len: 0,
        }
    }

    /// Builds a bitmap from per-row validity flags.
    pub fn from_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let mut bitmap = Self::empty();
        for valid in flags {
            bitmap.push(valid);
        }
        bitmap
    }

    /// Returns `true` if row `idx` holds a value.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks row `idx` as null.
    #[inline]
    pub fn set_invalid(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        self.bits[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Appends one row.
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.bits.len() {
            self.bits.push(0);
        }
        if valid {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Number of tracked rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no rows are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of null rows (popcount over the packed words).
    pub fn null_count(&self) -> usize {
        self.len - self.valid_count()
    }

    /// Number of non-null rows.
    pub fn valid_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the indices of non-null rows.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.is_valid(i))
    }

    /// Bitmap restricted to `indices`, in the given order.
    fn select(&self, indices: &[usize]) -> Self {
        Self::from_flags(indices.iter().map(|&i| self.is_valid(i)))
    }

    /// Bytes used by the packed words.
    pub(crate) fn byte_size(&self) -> usize {
        self.bits.len() * 8
    }
}

// ── ColumnKind ────────────────────────────────────────────────────────

/// Inferred kind of a column. Every column has exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Datetime,
    Boolean,
    /// Values of a kind the engine does not analyze.
    Other,
}

impl ColumnKind {
    /// Lowercase name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Value ─────────────────────────────────────────────────────────────

/// A single cell, as exposed in sample rows and frequency tables.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Boolean(bool),
    Text(String),
    Datetime(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            Self::Number(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Datetime(dt) => write!(f, "{}", dt.format(DATETIME_DISPLAY_FORMAT)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Number(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Number(_) => serializer.serialize_none(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Datetime(_) => serializer.collect_str(self),
        }
    }
}

/// Display format for datetime cells.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hashable identity of a non-null cell, used for distinct counts,
/// frequency tables and duplicate-row detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey<'a> {
    Number(u64),
    Boolean(bool),
    Text(&'a str),
    Datetime(NaiveDateTime),
}

fn number_key(v: f64) -> u64 {
    // +0.0 and -0.0 compare equal and must share a key
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with a validity bitmap.
///
/// Null positions hold a placeholder (0.0, false, empty string, or the
/// Unix epoch) that is never read.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric {
        values: Vec<f64>,
        validity: ValidityBitmap,
    },
    Boolean {
        values: Vec<bool>,
        validity: ValidityBitmap,
    },
    Datetime {
        values: Vec<NaiveDateTime>,
        validity: ValidityBitmap,
    },
    Text {
        values: Vec<String>,
        validity: ValidityBitmap,
    },
    /// Rendered values of an unsupported kind.
    Other {
        values: Vec<String>,
        validity: ValidityBitmap,
    },
}

fn split_options<T, I>(items: I) -> (Vec<T>, ValidityBitmap)
where
    T: Default,
    I: IntoIterator<Item = Option<T>>,
{
    let mut values = Vec::new();
    let mut validity = ValidityBitmap::empty();
    for item in items {
        validity.push(item.is_some());
        values.push(item.unwrap_or_default());
    }
    (values, validity)
}

impl Column {
    /// Creates a numeric column; `None` is null.
    pub fn numeric_from<I: IntoIterator<Item = Option<f64>>>(items: I) -> Self {
        let (values, validity) = split_options(items);
        Self::Numeric { values, validity }
    }

    /// Creates a text column; `None` is null.
    pub fn text_from<S, I>(items: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Option<S>>,
    {
        let (values, validity) = split_options(items.into_iter().map(|o| o.map(Into::into)));
        Self::Text { values, validity }
    }

    /// Creates a boolean column; `None` is null.
    pub fn boolean_from<I: IntoIterator<Item = Option<bool>>>(items: I) -> Self {
        let (values, validity) = split_options(items);
        Self::Boolean { values, validity }
    }

    /// Creates a datetime column; `None` is null.
    pub fn datetime_from<I: IntoIterator<Item = Option<NaiveDateTime>>>(items: I) -> Self {
        let (values, validity) = split_options(items);
        Self::Datetime { values, validity }
    }

    /// Creates a column of an unanalyzed kind from rendered values.
    pub fn other_from<S, I>(items: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Option<S>>,
    {
        let (values, validity) = split_options(items.into_iter().map(|o| o.map(Into::into)));
        Self::Other { values, validity }
    }

    /// Kind discriminant of this column.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric { .. } => ColumnKind::Numeric,
            Self::Boolean { .. } => ColumnKind::Boolean,
            Self::Datetime { .. } => ColumnKind::Datetime,
            Self::Text { .. } => ColumnKind::Text,
            Self::Other { .. } => ColumnKind::Other,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.validity().len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the dense value storage.
    fn storage_len(&self) -> usize {
        match self {
            Self::Numeric { values, .. } => values.len(),
            Self::Boolean { values, .. } => values.len(),
            Self::Datetime { values, .. } => values.len(),
            Self::Text { values, .. } | Self::Other { values, .. } => values.len(),
        }
    }

    /// The validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        match self {
            Self::Numeric { validity, .. }
            | Self::Boolean { validity, .. }
            | Self::Datetime { validity, .. }
            | Self::Text { validity, .. }
            | Self::Other { validity, .. } => validity,
        }
    }

    /// Number of nulls.
    pub fn null_count(&self) -> usize {
        self.validity().null_count()
    }

    /// Number of non-null values.
    pub fn valid_count(&self) -> usize {
        self.validity().valid_count()
    }

    /// Returns `true` if row `idx` holds a value.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.validity().is_valid(idx)
    }

    /// Non-null numeric values in row order, or `None` for other kinds.
    pub fn valid_numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values, validity } => {
                Some(validity.valid_indices().map(|i| values[i]).collect())
            }
            _ => None,
        }
    }

    /// Dense numeric storage, placeholders included, or `None` for other
    /// kinds. Pair with [`is_valid`](Self::is_valid).
    pub fn as_numeric_slice(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Non-null strings of a text column, or `None` for other kinds.
    pub fn valid_texts(&self) -> Option<Vec<&str>> {
        match self {
            Self::Text { values, validity } => {
                Some(validity.valid_indices().map(|i| values[i].as_str()).collect())
            }
            _ => None,
        }
    }

    /// The cell at `idx`.
    pub fn value_at(&self, idx: usize) -> Value {
        if !self.is_valid(idx) {
            return Value::Null;
        }
        match self {
            Self::Numeric { values, .. } => Value::Number(values[idx]),
            Self::Boolean { values, .. } => Value::Boolean(values[idx]),
            Self::Datetime { values, .. } => Value::Datetime(values[idx]),
            Self::Text { values, .. } | Self::Other { values, .. } => {
                Value::Text(values[idx].clone())
            }
        }
    }

    pub(crate) fn key_at(&self, idx: usize) -> Option<ValueKey<'_>> {
        if !self.is_valid(idx) {
            return None;
        }
        Some(match self {
            Self::Numeric { values, .. } => ValueKey::Number(number_key(values[idx])),
            Self::Boolean { values, .. } => ValueKey::Boolean(values[idx]),
            Self::Datetime { values, .. } => ValueKey::Datetime(values[idx]),
            Self::Text { values, .. } | Self::Other { values, .. } => {
                ValueKey::Text(values[idx].as_str())
            }
        })
    }

    /// Number of distinct non-null values.
    pub fn unique_count(&self) -> usize {
        let mut seen = HashSet::new();
        for idx in self.validity().valid_indices() {
            if let Some(key) = self.key_at(idx) {
                seen.insert(key);
            }
        }
        seen.len()
    }

    /// A new column holding the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i].clone()).collect()
        }
        match self {
            Self::Numeric { values, validity } => Self::Numeric {
                values: pick(values, indices),
                validity: validity.select(indices),
            },
            Self::Boolean { values, validity } => Self::Boolean {
                values: pick(values, indices),
                validity: validity.select(indices),
            },
            Self::Datetime { values, validity } => Self::Datetime {
                values: pick(values, indices),
                validity: validity.select(indices),
            },
            Self::Text { values, validity } => Self::Text {
                values: pick(values, indices),
                validity: validity.select(indices),
            },
            Self::Other { values, validity } => Self::Other {
                values: pick(values, indices),
                validity: validity.select(indices),
            },
        }
    }

    /// Estimated heap footprint in bytes, bitmap included.
    pub fn memory_bytes(&self) -> usize {
        let data = match self {
            Self::Numeric { values, .. } => values.len() * std::mem::size_of::<f64>(),
            Self::Boolean { values, .. } => values.len(),
            Self::Datetime { values, .. } => values.len() * std::mem::size_of::<NaiveDateTime>(),
            Self::Text { values, .. } | Self::Other { values, .. } => values
                .iter()
                .map(|s| s.len() + std::mem::size_of::<String>())
                .sum(),
        };
        data + self.validity().byte_size()
    }

    /// Orders two non-null rows of this column.
    fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match self {
            Self::Numeric { values, .. } => values[a].total_cmp(&values[b]),
            Self::Boolean { values, .. } => values[a].cmp(&values[b]),
            Self::Datetime { values, .. } => values[a].cmp(&values[b]),
            Self::Text { values, .. } | Self::Other { values, .. } => values[a].cmp(&values[b]),
        }
    }
}

// ── Table ─────────────────────────────────────────────────────────────

/// Column-major table. All columns share one row count and names are unique.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Creates a table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(name, column)` pairs.
    pub fn from_columns<S, I>(columns: I) -> Result<Self, ReportError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Column)>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    /// Appends a column.
    ///
    /// The first column fixes the row count; later columns must match it.
    /// A column whose values and bitmap disagree in length is rejected.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), ReportError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(ReportError::DuplicateColumn { name });
        }
        if column.storage_len() != column.len() {
            return Err(ReportError::DimensionMismatch {
                expected: column.len(),
                actual: column.storage_len(),
            });
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            return Err(ReportError::DimensionMismatch {
                expected: self.row_count,
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Looks up a column, failing with [`ReportError::InvalidColumn`].
    pub fn require_column(&self, name: &str) -> Result<&Column, ReportError> {
        self.column_by_name(name)
            .ok_or_else(|| ReportError::invalid_column(name))
    }

    /// Iterates over `(name, column)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Column names with their kinds.
    pub fn schema(&self) -> Vec<(&str, ColumnKind)> {
        self.iter().map(|(name, col)| (name, col.kind())).collect()
    }

    /// Names of the columns of `kind`, in table order.
    pub fn names_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.iter()
            .filter(|(_, col)| col.kind() == kind)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Rows × columns.
    pub fn total_cells(&self) -> usize {
        self.row_count * self.columns.len()
    }

    /// Nulls across all columns.
    pub fn total_null_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// The cells of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value_at(idx)).collect()
    }

    /// A new table holding the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
            row_count: if self.columns.is_empty() { 0 } else { indices.len() },
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let indices: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.select_rows(&indices)
    }

    /// Rows sorted by `column`. The sort is stable and nulls go last in
    /// either direction.
    ///
    /// ```
    /// use u_report::table::{Column, Table, Value};
    ///
    /// let t = Table::from_columns(vec![
    ///     ("x", Column::numeric_from([Some(3.0), None, Some(1.0)])),
    /// ]).unwrap();
    /// let sorted = t.sort_by("x", true).unwrap();
    /// assert_eq!(sorted.row(0), vec![Value::Number(1.0)]);
    /// assert_eq!(sorted.row(2), vec![Value::Null]);
    /// assert!(t.sort_by("nope", true).is_err());
    /// ```
    pub fn sort_by(&self, column: &str, ascending: bool) -> Result<Self, ReportError> {
        let col = self.require_column(column)?;
        let mut indices: Vec<usize> = (0..self.row_count).collect();
        indices.sort_by(|&a, &b| match (col.is_valid(a), col.is_valid(b)) {
            (true, true) => {
                let ord = col.compare_rows(a, b);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        });
        Ok(self.select_rows(&indices))
    }

    /// Rows whose rendered value contains the pattern, case-insensitively,
    /// for every `(column, pattern)` filter. Nulls never match.
    pub fn filter_contains(&self, filters: &[(&str, &str)]) -> Result<Self, ReportError> {
        let mut keep: Vec<usize> = (0..self.row_count).collect();
        for &(name, pattern) in filters {
            let col = self.require_column(name)?;
            let needle = pattern.to_lowercase();
            keep.retain(|&i| {
                let value = col.value_at(i);
                !value.is_null() && value.to_string().to_lowercase().contains(&needle)
            });
        }
        Ok(self.select_rows(&keep))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    // ── ValidityBitmap ───────────────────────────────────────────

    #[test]
    fn bitmap_counts_across_word_boundary() {
        let bm = ValidityBitmap::from_flags((0..130).map(|i| i % 4 != 0));
        assert_eq!(bm.len(), 130);
        assert_eq!(bm.null_count(), (0..130).filter(|i| i % 4 == 0).count());
        assert!(bm.is_valid(129));
        assert!(!bm.is_valid(128));
    }

    #[test]
    fn bitmap_all_valid_tail_bits() {
        let bm = ValidityBitmap::all_valid(65);
        assert_eq!(bm.valid_count(), 65);
        assert_eq!(bm.byte_size(), 16);
        let mut bm = ValidityBitmap::all_valid(3);
        bm.set_invalid(1);
        assert_eq!(bm.valid_indices().collect::<Vec<_>>(), vec![0, 2]);
    }

    // ── Column ───────────────────────────────────────────────────

    #[test]
    fn numeric_from_options() {
        let col = Column::numeric_from([Some(1.0), None, Some(3.0)]);
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.valid_numeric_values(), Some(vec![1.0, 3.0]));
        assert_eq!(col.value_at(1), Value::Null);
    }

    #[test]
    fn unique_count_ignores_nulls_and_signed_zero() {
        let col = Column::numeric_from([Some(0.0), Some(-0.0), None, Some(2.0)]);
        assert_eq!(col.unique_count(), 2);
        let text = Column::text_from([Some("a"), Some("b"), Some("a"), None]);
        assert_eq!(text.unique_count(), 2);
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Datetime(dt(2024, 1, 5)).to_string(), "2024-01-05 00:00:00");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn value_serializes_plainly() {
        let row = vec![
            Value::Number(1.5),
            Value::Null,
            Value::Text("x".into()),
            Value::Boolean(true),
            Value::Number(f64::NAN),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[1.5,null,"x",true,null]"#);
    }

    // ── Table ────────────────────────────────────────────────────

    fn sample() -> Table {
        Table::from_columns(vec![
            ("id", Column::numeric_from([Some(2.0), Some(1.0), None, Some(3.0)])),
            (
                "name",
                Column::text_from([Some("Bob"), Some("alice"), Some("ALAN"), None]),
            ),
            (
                "seen",
                Column::datetime_from([Some(dt(2024, 2, 1)), None, Some(dt(2023, 5, 1)), None]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn table_shape() {
        let t = sample();
        assert_eq!(t.row_count(), 4);
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.total_cells(), 12);
        assert_eq!(t.total_null_count(), 4);
        assert_eq!(t.names_of_kind(ColumnKind::Datetime), vec!["seen".to_string()]);
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut t = Table::new();
        t.add_column("x", Column::numeric_from([Some(1.0), Some(2.0)]))
            .unwrap();
        let err = t
            .add_column("y", Column::numeric_from([Some(1.0)]))
            .unwrap_err();
        assert_eq!(
            err,
            ReportError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn values_and_bitmap_length_must_agree() {
        let short = Column::Numeric {
            values: vec![1.0],
            validity: ValidityBitmap::all_valid(3),
        };
        let err = Table::from_columns(vec![("x", short)]).unwrap_err();
        assert_eq!(
            err,
            ReportError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        );

        let long = Column::Text {
            values: vec!["a".into(), "b".into()],
            validity: ValidityBitmap::from_flags([true]),
        };
        assert!(Table::from_columns(vec![("s", long)]).is_err());
    }

    #[test]
    fn duplicate_name_rejected() {
        let err = Table::from_columns(vec![
            ("x", Column::numeric_from([Some(1.0)])),
            ("x", Column::numeric_from([Some(2.0)])),
        ])
        .unwrap_err();
        assert!(matches!(err, ReportError::DuplicateColumn { name } if name == "x"));
    }

    #[test]
    fn head_limits_rows() {
        let t = sample();
        assert_eq!(t.head(2).row_count(), 2);
        assert_eq!(t.head(10).row_count(), 4);
        assert_eq!(t.head(2).row(1)[0], Value::Number(1.0));
    }

    #[test]
    fn sort_descending_nulls_last() {
        let sorted = sample().sort_by("id", false).unwrap();
        let ids: Vec<Value> = (0..4).map(|i| sorted.row(i)[0].clone()).collect();
        assert_eq!(
            ids,
            vec![
                Value::Number(3.0),
                Value::Number(2.0),
                Value::Number(1.0),
                Value::Null
            ]
        );
    }

    #[test]
    fn sort_by_datetime() {
        let sorted = sample().sort_by("seen", true).unwrap();
        assert_eq!(sorted.row(0)[2], Value::Datetime(dt(2023, 5, 1)));
    }

    #[test]
    fn sort_unknown_column() {
        let err = sample().sort_by("missing", true).unwrap_err();
        assert_eq!(err, ReportError::invalid_column("missing"));
    }

    #[test]
    fn filter_case_insensitive() {
        let filtered = sample().filter_contains(&[("name", "al")]).unwrap();
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.row(0)[1], Value::Text("alice".into()));
        assert_eq!(filtered.row(1)[1], Value::Text("ALAN".into()));
    }

    #[test]
    fn filter_numeric_by_rendering_and_unknown_column() {
        let t = sample();
        assert_eq!(t.filter_contains(&[("id", "3")]).unwrap().row_count(), 1);
        assert!(matches!(
            t.filter_contains(&[("ghost", "x")]),
            Err(ReportError::InvalidColumn { .. })
        ));
    }
}
