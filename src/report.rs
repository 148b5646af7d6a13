//! Report assembly.
//!
//! [`generate_report`] turns a [`Table`] into a [`ReportModel`]: a title, an
//! ordered list of typed [`Section`]s and the dataset's
//! [`BasicStatistics`]. Which sections appear depends on the
//! [`ReportType`]:
//!
//! | Type | Title | Sections |
//! |------|-------|----------|
//! | summary | Data Summary Report | Data Overview, Numeric Analysis¹, Text Analysis² |
//! | detailed | Detailed Data Analysis | Column: *name* (each), Correlation Analysis³ |
//! | overview | Data Overview Report | Quick Statistics, Data Types |
//!
//! ¹ at least one numeric column. ² at least one text column. ³ at least
//! two numeric columns.
//!
//! The model is handed to renderers as-is and never flows back into the
//! engine.
//!
//! ```
//! use u_report::report::{generate_report, ReportType};
//! use u_report::table::{Column, Table};
//!
//! let t = Table::from_columns(vec![
//!     ("id", Column::numeric_from([Some(1.0), Some(2.0)])),
//! ]).unwrap();
//! let report = generate_report(&t, ReportType::Summary);
//! assert_eq!(report.title, "Data Summary Report");
//! let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
//! assert_eq!(titles, ["Data Overview", "Numeric Analysis"]);
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;

use crate::classify::{classify_columns, type_breakdown, TypeBreakdown};
use crate::column_analysis::{analyze_column, profile_column, value_counts, ColumnDetail, ColumnProfile, ValueCount};
use crate::config::AnalysisConfig;
use crate::correlation::{analyze_correlations, CorrelationOutcome};
use crate::error::ReportError;
use crate::quality::{assess_quality, completeness_fraction, round_to, QualityAssessment};
use crate::statistics::{compute_basic_statistics, BasicStatistics};
use crate::table::{ColumnKind, Table, Value};

// ── ReportType ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[default]
    Summary,
    Detailed,
    Overview,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detailed => "detailed",
            Self::Overview => "overview",
        }
    }

    /// Report title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Summary => "Data Summary Report",
            Self::Detailed => "Detailed Data Analysis",
            Self::Overview => "Data Overview Report",
        }
    }

    /// Parses a report type, falling back to [`ReportType::Summary`] for
    /// unrecognized input.
    ///
    /// ```
    /// use u_report::report::ReportType;
    ///
    /// assert_eq!(ReportType::parse_lenient(" Detailed "), ReportType::Detailed);
    /// assert_eq!(ReportType::parse_lenient("weekly"), ReportType::Summary);
    /// ```
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or_else(|_| {
            tracing::warn!(input, "unknown report type, using summary");
            Self::Summary
        })
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "detailed" => Ok(Self::Detailed),
            "overview" => Ok(Self::Overview),
            other => Err(ReportError::UnknownReportType {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Sections ──────────────────────────────────────────────────────────

/// Record counts, quality and frequency tables of the summary report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataOverview {
    pub total_records: usize,
    pub total_fields: usize,
    pub data_quality: QualityAssessment,
    /// Top values for text columns and for low-cardinality columns.
    pub top_values: IndexMap<String, Vec<ValueCount>>,
}

/// Compact shape and sample of the overview report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStatistics {
    /// `"R rows × C columns"`.
    pub shape: String,
    /// Non-null cells as a percentage, one decimal.
    pub completeness_percentage: f64,
    pub unique_values: IndexMap<String, usize>,
    /// Leading rows keyed by column name.
    pub sample_data: Vec<IndexMap<String, Value>>,
}

/// Typed section payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionContent {
    Overview(DataOverview),
    NumericAnalysis(Vec<ColumnProfile>),
    TextAnalysis(Vec<ColumnProfile>),
    Column(ColumnDetail),
    Correlation(CorrelationOutcome),
    QuickStats(QuickStatistics),
    TypeBreakdown(TypeBreakdown),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    #[serde(flatten)]
    pub content: SectionContent,
}

impl Section {
    fn new(title: impl Into<String>, content: SectionContent) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }
}

// ── ReportModel ───────────────────────────────────────────────────────

/// Structured report handed to renderers and chart generators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    pub report_type: ReportType,
    pub title: String,
    pub sections: Vec<Section>,
    pub basic_statistics: BasicStatistics,
}

impl ReportModel {
    /// Section by title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ── Assembly ──────────────────────────────────────────────────────────

fn profiles_of_kind(table: &Table, kind: ColumnKind, config: &AnalysisConfig) -> Vec<ColumnProfile> {
    table
        .iter()
        .filter(|(_, col)| col.kind() == kind)
        .filter_map(|(name, col)| profile_column(name, col, config))
        .collect()
}

fn summary_sections(table: &Table, config: &AnalysisConfig) -> Vec<Section> {
    let top_values = table
        .iter()
        .filter(|(_, col)| {
            col.kind() == ColumnKind::Text || col.unique_count() < config.categorical_max_unique
        })
        .map(|(name, col)| (name.to_string(), value_counts(col, config.top_values_limit)))
        .collect();

    let mut sections = vec![Section::new(
        "Data Overview",
        SectionContent::Overview(DataOverview {
            total_records: table.row_count(),
            total_fields: table.column_count(),
            data_quality: assess_quality(table),
            top_values,
        }),
    )];

    let numeric = profiles_of_kind(table, ColumnKind::Numeric, config);
    if !numeric.is_empty() {
        sections.push(Section::new(
            "Numeric Analysis",
            SectionContent::NumericAnalysis(numeric),
        ));
    }
    let text = profiles_of_kind(table, ColumnKind::Text, config);
    if !text.is_empty() {
        sections.push(Section::new("Text Analysis", SectionContent::TextAnalysis(text)));
    }
    sections
}

fn detailed_sections(table: &Table, config: &AnalysisConfig) -> Vec<Section> {
    let mut sections: Vec<Section> = table
        .iter()
        .map(|(name, col)| {
            Section::new(
                format!("Column: {name}"),
                SectionContent::Column(analyze_column(name, col, config)),
            )
        })
        .collect();

    if table.names_of_kind(ColumnKind::Numeric).len() >= 2 {
        sections.push(Section::new(
            "Correlation Analysis",
            SectionContent::Correlation(analyze_correlations(table, config)),
        ));
    }
    sections
}

fn overview_sections(table: &Table, config: &AnalysisConfig) -> Vec<Section> {
    let sample = table.head(config.sample_rows);
    let sample_data = (0..sample.row_count())
        .map(|row| {
            sample
                .iter()
                .map(|(name, col)| (name.to_string(), col.value_at(row)))
                .collect()
        })
        .collect();

    let quick = QuickStatistics {
        shape: format!("{} rows × {} columns", table.row_count(), table.column_count()),
        completeness_percentage: round_to(completeness_fraction(table) * 100.0, 1),
        unique_values: table
            .iter()
            .map(|(name, col)| (name.to_string(), col.unique_count()))
            .collect(),
        sample_data,
    };

    let breakdown = type_breakdown(&classify_columns(table, config));
    vec![
        Section::new("Quick Statistics", SectionContent::QuickStats(quick)),
        Section::new("Data Types", SectionContent::TypeBreakdown(breakdown)),
    ]
}

/// Builds a report with default settings.
pub fn generate_report(table: &Table, report_type: ReportType) -> ReportModel {
    generate_report_with(table, report_type, &AnalysisConfig::default())
}

/// Builds a report of `report_type` for `table`.
pub fn generate_report_with(
    table: &Table,
    report_type: ReportType,
    config: &AnalysisConfig,
) -> ReportModel {
    tracing::debug!(
        %report_type,
        rows = table.row_count(),
        columns = table.column_count(),
        "generating report"
    );

    let sections = match report_type {
        ReportType::Summary => summary_sections(table, config),
        ReportType::Detailed => detailed_sections(table, config),
        ReportType::Overview => overview_sections(table, config),
    };

    ReportModel {
        report_type,
        title: report_type.title().to_string(),
        sections,
        basic_statistics: compute_basic_statistics(table),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
