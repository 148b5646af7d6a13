//! Per-column descriptive profiles.
//!
//! [`profile_column`] dispatches once on the column kind and returns a
//! tagged [`ColumnProfile`]. Aggregates are computed over non-null values
//! only. A numeric column without any non-null value reports
//! [`NumericStats::NoData`] instead of NaN-filled statistics, so sparse
//! input never leaks NaN into a report.
//!
//! ```
//! use u_report::column_analysis::{profile_column, ColumnProfile, NumericStats};
//! use u_report::config::AnalysisConfig;
//! use u_report::table::Column;
//!
//! let col = Column::numeric_from([Some(1.0), Some(2.0), Some(3.0), Some(2.0)]);
//! let profile = profile_column("id", &col, &AnalysisConfig::default()).unwrap();
//! match profile {
//!     ColumnProfile::Numeric(p) => match p.stats {
//!         NumericStats::Available(s) => {
//!             assert_eq!(s.mean, 2.0);
//!             assert_eq!(s.median, 2.0);
//!         }
//!         NumericStats::NoData => unreachable!(),
//!     },
//!     _ => unreachable!(),
//! }
//! ```

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::outliers;
use crate::table::{Column, ColumnKind, Value};

// ── Frequency tables ──────────────────────────────────────────────────

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

/// The `limit` most frequent non-null values, by count descending.
/// Ties keep the order of first appearance.
pub fn value_counts(col: &Column, limit: usize) -> Vec<ValueCount> {
    // key -> (first row, count)
    let mut freq: HashMap<_, (usize, usize)> = HashMap::new();
    for row in col.validity().valid_indices() {
        if let Some(key) = col.key_at(row) {
            freq.entry(key).or_insert((row, 0)).1 += 1;
        }
    }
    let mut entries: Vec<(usize, usize)> = freq.into_values().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(row, count)| ValueCount {
            value: col.value_at(row),
            count,
        })
        .collect()
}

// ── Numeric ───────────────────────────────────────────────────────────

/// First and third quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
}

/// Descriptive statistics over the non-null values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub quartiles: Quartiles,
    pub outliers_count: usize,
}

/// Numeric statistics, or an explicit marker when there is nothing to
/// aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NumericStats {
    Available(NumericSummary),
    NoData,
}

impl NumericStats {
    /// The summary, if there was data.
    pub fn summary(&self) -> Option<&NumericSummary> {
        match self {
            Self::Available(s) => Some(s),
            Self::NoData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericProfile {
    pub name: String,
    /// Non-null values.
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub stats: NumericStats,
}

/// Summarizes a sample of non-null values. Non-finite values are skipped;
/// [`NumericStats::NoData`] is returned only when nothing finite remains.
pub fn summarize_numeric(values: &[f64], iqr_multiplier: f64) -> NumericStats {
    match numeric_summary(values, iqr_multiplier) {
        Some(summary) => NumericStats::Available(summary),
        None => NumericStats::NoData,
    }
}

fn numeric_summary(values: &[f64], k: f64) -> Option<NumericSummary> {
    // infinities from the input carry no usable magnitude
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let values = finite.as_slice();
    if values.is_empty() {
        return None;
    }
    let mean = u_numflow::stats::mean(values)?;
    let median = u_numflow::stats::median(values)?;
    let min = u_numflow::stats::min(values)?;
    let max = u_numflow::stats::max(values)?;
    let std = if values.len() > 1 {
        u_numflow::stats::std_dev(values).filter(|s| s.is_finite())
    } else {
        None
    };
    let bounds = outliers::iqr_bounds(values, k)?;
    Some(NumericSummary {
        mean,
        median,
        std,
        min,
        max,
        quartiles: Quartiles {
            q1: bounds.q1,
            q3: bounds.q3,
        },
        outliers_count: outliers::count_outliers_with(values, k),
    })
}

// ── Text ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextProfile {
    pub name: String,
    pub null_count: usize,
    pub unique_count: usize,
    /// Most frequent values (top 3 by default).
    pub most_common: Vec<ValueCount>,
    /// Mean length in characters; absent when every value is null.
    pub avg_length: Option<f64>,
    /// Values containing at least one digit.
    pub contains_numbers: usize,
    /// Values containing a character other than ASCII letters, digits or
    /// whitespace.
    pub contains_special_chars: usize,
}

fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

fn has_special(s: &str) -> bool {
    s.chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c.is_whitespace()))
}

// ── Boolean / Datetime ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanProfile {
    pub name: String,
    pub null_count: usize,
    pub unique_count: usize,
    pub true_count: usize,
    pub false_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatetimeProfile {
    pub name: String,
    pub null_count: usize,
    pub unique_count: usize,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
}

// ── ColumnProfile ─────────────────────────────────────────────────────

/// Kind-specific profile of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnProfile {
    Numeric(NumericProfile),
    Text(TextProfile),
    Boolean(BooleanProfile),
    Datetime(DatetimeProfile),
}

impl ColumnProfile {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric(p) => &p.name,
            Self::Text(p) => &p.name,
            Self::Boolean(p) => &p.name,
            Self::Datetime(p) => &p.name,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Text(_) => ColumnKind::Text,
            Self::Boolean(_) => ColumnKind::Boolean,
            Self::Datetime(_) => ColumnKind::Datetime,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            Self::Numeric(p) => p.null_count,
            Self::Text(p) => p.null_count,
            Self::Boolean(p) => p.null_count,
            Self::Datetime(p) => p.null_count,
        }
    }

    pub fn unique_count(&self) -> usize {
        match self {
            Self::Numeric(p) => p.unique_count,
            Self::Text(p) => p.unique_count,
            Self::Boolean(p) => p.unique_count,
            Self::Datetime(p) => p.unique_count,
        }
    }
}

/// Profiles a column according to its kind.
///
/// Returns `None` for [`ColumnKind::Other`] columns, which are excluded
/// from kind-specific analysis.
pub fn profile_column(name: &str, col: &Column, config: &AnalysisConfig) -> Option<ColumnProfile> {
    let null_count = col.null_count();
    let unique_count = col.unique_count();
    let name = name.to_string();

    let profile = match col {
        Column::Numeric { values, validity } => {
            let valid: Vec<f64> = validity.valid_indices().map(|i| values[i]).collect();
            ColumnProfile::Numeric(NumericProfile {
                name,
                count: valid.len(),
                null_count,
                unique_count,
                stats: summarize_numeric(&valid, config.iqr_multiplier),
            })
        }
        Column::Text { values, validity } => {
            let valid: Vec<&str> = validity
                .valid_indices()
                .map(|i| values[i].as_str())
                .collect();
            let avg_length = if valid.is_empty() {
                None
            } else {
                let total: usize = valid.iter().map(|s| s.chars().count()).sum();
                Some(total as f64 / valid.len() as f64)
            };
            ColumnProfile::Text(TextProfile {
                name,
                null_count,
                unique_count,
                most_common: value_counts(col, config.most_common_limit),
                avg_length,
                contains_numbers: valid.iter().filter(|s| has_digit(s)).count(),
                contains_special_chars: valid.iter().filter(|s| has_special(s)).count(),
            })
        }
        Column::Boolean { values, validity } => {
            let true_count = validity.valid_indices().filter(|&i| values[i]).count();
            ColumnProfile::Boolean(BooleanProfile {
                name,
                null_count,
                unique_count,
                true_count,
                false_count: col.valid_count() - true_count,
            })
        }
        Column::Datetime { values, validity } => {
            let valid: Vec<NaiveDateTime> = validity.valid_indices().map(|i| values[i]).collect();
            ColumnProfile::Datetime(DatetimeProfile {
                name,
                null_count,
                unique_count,
                earliest: valid.iter().min().copied(),
                latest: valid.iter().max().copied(),
            })
        }
        Column::Other { .. } => return None,
    };
    Some(profile)
}

// ── Detailed column analysis ──────────────────────────────────────────

/// Full per-column analysis used by the detailed report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDetail {
    pub name: String,
    pub data_type: ColumnKind,
    pub total_count: usize,
    pub non_null_count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    /// Nulls as a percentage of rows; 0 for an empty column.
    pub null_percentage: f64,
    /// max − min, for numeric columns with data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    /// Most frequent value, for text columns with data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_frequent: Option<Value>,
    /// Most frequent values (top 5 by default), for text columns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_values: Vec<ValueCount>,
    /// Kind-specific profile; absent for unanalyzed kinds.
    pub profile: Option<ColumnProfile>,
}

/// Analyzes one column in full.
pub fn analyze_column(name: &str, col: &Column, config: &AnalysisConfig) -> ColumnDetail {
    let total_count = col.len();
    let null_count = col.null_count();
    let null_percentage = if total_count > 0 {
        null_count as f64 / total_count as f64 * 100.0
    } else {
        0.0
    };
    let profile = profile_column(name, col, config);

    let range = match &profile {
        Some(ColumnProfile::Numeric(p)) => p.stats.summary().map(|s| s.max - s.min),
        _ => None,
    };
    let top_values = match col.kind() {
        ColumnKind::Text => value_counts(col, config.top_values_limit),
        _ => Vec::new(),
    };
    let most_frequent = top_values.first().map(|vc| vc.value.clone());

    ColumnDetail {
        name: name.to_string(),
        data_type: col.kind(),
        total_count,
        non_null_count: col.valid_count(),
        null_count,
        unique_count: profile
            .as_ref()
            .map_or_else(|| col.unique_count(), ColumnProfile::unique_count),
        null_percentage,
        range,
        most_frequent,
        top_values,
        profile,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    fn numeric(profile: Option<ColumnProfile>) -> NumericProfile {
        match profile {
            Some(ColumnProfile::Numeric(p)) => p,
            other => panic!("expected numeric profile, got {other:?}"),
        }
    }

    fn text(profile: Option<ColumnProfile>) -> TextProfile {
        match profile {
            Some(ColumnProfile::Text(p)) => p,
            other => panic!("expected text profile, got {other:?}"),
        }
    }

    // ── Numeric ──────────────────────────────────────────────────

    #[test]
    fn numeric_scenario_values() {
        let col = Column::numeric_from([Some(1.0), Some(2.0), Some(3.0), Some(2.0)]);
        let p = numeric(profile_column("id", &col, &config()));
        assert_eq!(p.count, 4);
        assert_eq!(p.unique_count, 3);
        let s = p.stats.summary().expect("data");
        assert!((s.mean - 2.0).abs() < 1e-12);
        assert!((s.median - 2.0).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.outliers_count, 0);
        let std = s.std.expect("sample std");
        assert!((std - (2.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn numeric_all_null_is_no_data() {
        let col = Column::numeric_from([None, None, None]);
        let p = numeric(profile_column("empty", &col, &config()));
        assert_eq!(p.count, 0);
        assert_eq!(p.null_count, 3);
        assert_eq!(p.stats, NumericStats::NoData);

        let json = serde_json::to_value(&p.stats).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "no_data" }));
    }

    #[test]
    fn non_finite_values_do_not_hide_stats() {
        let col = Column::numeric_from([Some(f64::NAN), Some(1.0), Some(2.0)]);
        let p = numeric(profile_column("x", &col, &config()));
        assert_eq!(p.count, 3);
        let s = p.stats.summary().expect("finite values present");
        assert_eq!(s.mean, 1.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 2.0);

        let only_inf = Column::numeric_from([Some(f64::INFINITY), Some(f64::NEG_INFINITY)]);
        let p = numeric(profile_column("y", &only_inf, &config()));
        assert_eq!(p.stats, NumericStats::NoData);
    }

    #[test]
    fn infinite_csv_cell_matches_basic_statistics() {
        let t = crate::ingest::CsvLoader::new()
            .load_str("x,y\n1,2\ninf,3\n3,5\n4,1\n")
            .unwrap();
        let col = t.require_column("x").unwrap();
        let p = numeric(profile_column("x", col, &config()));
        assert_eq!(p.count, 4);
        let mean = p.stats.summary().expect("finite values present").mean;
        assert!((mean - 8.0 / 3.0).abs() < 1e-12);

        let basic = crate::statistics::compute_basic_statistics(&t)
            .numeric_stats
            .expect("numeric columns");
        assert_eq!(basic.mean["x"], Some(mean));
    }

    #[test]
    fn numeric_single_value_has_no_std() {
        let col = Column::numeric_from([Some(7.0), None]);
        let p = numeric(profile_column("x", &col, &config()));
        let s = p.stats.summary().expect("data");
        assert_eq!(s.std, None);
        assert_eq!(s.quartiles, Quartiles { q1: 7.0, q3: 7.0 });
    }

    #[test]
    fn numeric_outliers_counted() {
        let col = Column::numeric_from(
            [1.0, 2.0, 3.0, 2.5, 100.0, 2.0, 3.0, 2.0].map(Some),
        );
        let p = numeric(profile_column("x", &col, &config()));
        assert_eq!(p.stats.summary().expect("data").outliers_count, 1);
    }

    // ── Text ─────────────────────────────────────────────────────

    #[test]
    fn text_digit_and_special_counts() {
        let col = Column::text_from([Some("a1"), Some("b!"), Some("c")]);
        let p = text(profile_column("code", &col, &config()));
        assert_eq!(p.contains_numbers, 1);
        assert_eq!(p.contains_special_chars, 1);
        assert_eq!(p.unique_count, 3);
    }

    #[test]
    fn whitespace_is_not_special() {
        let col = Column::text_from([Some("hello world"), Some("tab\there"), Some("a-b")]);
        let p = text(profile_column("t", &col, &config()));
        assert_eq!(p.contains_special_chars, 1);
        assert_eq!(p.contains_numbers, 0);
    }

    #[test]
    fn text_most_common_top_three() {
        let col = Column::text_from(
            ["b", "a", "b", "c", "a", "b", "d", "e"].map(Some),
        );
        let p = text(profile_column("t", &col, &config()));
        let top: Vec<(String, usize)> = p
            .most_common
            .iter()
            .map(|vc| (vc.value.to_string(), vc.count))
            .collect();
        assert_eq!(
            top,
            vec![("b".into(), 3), ("a".into(), 2), ("c".into(), 1)]
        );
    }

    #[test]
    fn text_average_length_in_chars() {
        let col = Column::text_from([Some("ab"), Some("äbc"), None]);
        let p = text(profile_column("t", &col, &config()));
        assert_eq!(p.avg_length, Some(2.5));
        assert_eq!(p.null_count, 1);
    }

    #[test]
    fn text_all_null() {
        let col = Column::text_from([None::<&str>, None]);
        let p = text(profile_column("t", &col, &config()));
        assert_eq!(p.avg_length, None);
        assert!(p.most_common.is_empty());
    }

    // ── Boolean / Datetime / Other ───────────────────────────────

    #[test]
    fn boolean_counts() {
        let col = Column::boolean_from([Some(true), Some(false), Some(true), None]);
        match profile_column("b", &col, &config()) {
            Some(ColumnProfile::Boolean(p)) => {
                assert_eq!(p.true_count, 2);
                assert_eq!(p.false_count, 1);
                assert_eq!(p.null_count, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn datetime_extremes() {
        let d = |day| {
            NaiveDate::from_ymd_opt(2024, 1, day)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid")
        };
        let col = Column::datetime_from([Some(d(9)), None, Some(d(2)), Some(d(5))]);
        match profile_column("d", &col, &config()) {
            Some(ColumnProfile::Datetime(p)) => {
                assert_eq!(p.earliest, Some(d(2)));
                assert_eq!(p.latest, Some(d(9)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_kind_is_not_profiled() {
        let col = Column::other_from([Some("x")]);
        assert!(profile_column("o", &col, &config()).is_none());
        let detail = analyze_column("o", &col, &config());
        assert_eq!(detail.data_type, ColumnKind::Other);
        assert_eq!(detail.unique_count, 1);
    }

    // ── Detailed ─────────────────────────────────────────────────

    #[test]
    fn detail_numeric_range_and_nulls() {
        let col = Column::numeric_from([Some(4.0), None, Some(10.0), Some(6.0)]);
        let d = analyze_column("x", &col, &config());
        assert_eq!(d.total_count, 4);
        assert_eq!(d.non_null_count, 3);
        assert_eq!(d.null_count, 1);
        assert_eq!(d.null_percentage, 25.0);
        assert_eq!(d.range, Some(6.0));
        assert!(d.top_values.is_empty());
        assert!(d.most_frequent.is_none());
    }

    #[test]
    fn detail_text_most_frequent() {
        let col = Column::text_from(["x", "y", "y", "z"].map(Some));
        let d = analyze_column("t", &col, &config());
        assert_eq!(d.most_frequent, Some(Value::Text("y".into())));
        assert_eq!(d.top_values.len(), 3);
        assert_eq!(d.range, None);
    }

    #[test]
    fn detail_empty_column() {
        let col = Column::numeric_from(Vec::<Option<f64>>::new());
        let d = analyze_column("x", &col, &config());
        assert_eq!(d.null_percentage, 0.0);
        assert_eq!(d.range, None);
    }

    #[test]
    fn value_counts_tie_order() {
        let col = Column::numeric_from([Some(3.0), Some(1.0), Some(1.0), Some(3.0), Some(2.0)]);
        let counts = value_counts(&col, 10);
        assert_eq!(
            counts,
            vec![
                ValueCount { value: Value::Number(3.0), count: 2 },
                ValueCount { value: Value::Number(1.0), count: 2 },
                ValueCount { value: Value::Number(2.0), count: 1 },
            ]
        );
    }
}
