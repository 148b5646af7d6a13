//! Column classification by kind and cardinality role.
//!
//! Every column maps to exactly one [`ColumnKind`]. On top of the kind, a
//! column may carry a role derived from its distinct-value count:
//!
//! - a text column with fewer than 20 distinct values is **categorical**;
//! - a numeric column with more than 20 distinct values is **continuous**;
//! - every other column has no role.
//!
//! ```
//! use u_report::classify::{classify_columns, ColumnRole};
//! use u_report::config::AnalysisConfig;
//! use u_report::table::{Column, Table};
//!
//! let t = Table::from_columns(vec![
//!     ("grade", Column::text_from([Some("A"), Some("B"), Some("A")])),
//!     ("score", Column::numeric_from([Some(1.0), Some(2.0), Some(3.0)])),
//! ]).unwrap();
//! let classes = classify_columns(&t, &AnalysisConfig::default());
//! assert_eq!(classes[0].role, Some(ColumnRole::Categorical));
//! assert_eq!(classes[1].role, None);
//! ```

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::table::{Column, ColumnKind, Table};

/// Cardinality-derived role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Categorical,
    Continuous,
}

/// Classification of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnClass {
    pub name: String,
    pub kind: ColumnKind,
    pub unique_count: usize,
    pub role: Option<ColumnRole>,
}

/// Number of columns of each kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindCounts {
    pub numeric: usize,
    pub text: usize,
    pub datetime: usize,
    pub boolean: usize,
    pub other: usize,
}

/// Column names grouped by kind and by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub counts: KindCounts,
    pub numeric: Vec<String>,
    pub text: Vec<String>,
    pub datetime: Vec<String>,
    pub boolean: Vec<String>,
    pub other: Vec<String>,
    pub categorical: Vec<String>,
    pub continuous: Vec<String>,
}

/// Classifies a single column.
pub fn classify_column(name: &str, col: &Column, config: &AnalysisConfig) -> ColumnClass {
    let kind = col.kind();
    let unique_count = col.unique_count();
    let role = match kind {
        ColumnKind::Text if unique_count < config.categorical_max_unique => {
            Some(ColumnRole::Categorical)
        }
        ColumnKind::Numeric if unique_count > config.continuous_min_unique => {
            Some(ColumnRole::Continuous)
        }
        _ => None,
    };
    ColumnClass {
        name: name.to_string(),
        kind,
        unique_count,
        role,
    }
}

/// Classifies every column, in table order.
pub fn classify_columns(table: &Table, config: &AnalysisConfig) -> Vec<ColumnClass> {
    table
        .iter()
        .map(|(name, col)| classify_column(name, col, config))
        .collect()
}

/// Groups classified columns by kind and role.
pub fn type_breakdown(classes: &[ColumnClass]) -> TypeBreakdown {
    let mut breakdown = TypeBreakdown::default();
    for class in classes {
        let name = class.name.clone();
        match class.kind {
            ColumnKind::Numeric => {
                breakdown.counts.numeric += 1;
                breakdown.numeric.push(name.clone());
            }
            ColumnKind::Text => {
                breakdown.counts.text += 1;
                breakdown.text.push(name.clone());
            }
            ColumnKind::Datetime => {
                breakdown.counts.datetime += 1;
                breakdown.datetime.push(name.clone());
            }
            ColumnKind::Boolean => {
                breakdown.counts.boolean += 1;
                breakdown.boolean.push(name.clone());
            }
            ColumnKind::Other => {
                breakdown.counts.other += 1;
                breakdown.other.push(name.clone());
            }
        }
        match class.role {
            Some(ColumnRole::Categorical) => breakdown.categorical.push(name),
            Some(ColumnRole::Continuous) => breakdown.continuous.push(name),
            None => {}
        }
    }
    breakdown
}
