//! # u-report
//!
//! Tabular data analysis engine with C FFI bindings.
//!
//! u-report turns an in-memory table into a structured, serializable
//! report model: descriptive statistics, data-quality metrics, outlier
//! counts, correlation findings and categorical summaries, arranged into
//! sections according to a report type. Rendering (HTML, PDF, charts) is
//! left to consumers of the model.
//!
//! ## Modules
//!
//! - [`table`]: Column-major data model (Table, Column, ColumnKind, Value)
//! - [`ingest`]: CSV loading with cleaning and kind inference
//! - [`classify`]: Column kinds and categorical/continuous roles
//! - [`outliers`]: IQR (Tukey fence) outlier counting
//! - [`quality`]: Completeness, duplicate rows, composite quality score
//! - [`correlation`]: Pairwise Pearson matrix and strong pairs
//! - [`column_analysis`]: Per-column numeric/text/boolean/datetime profiles
//! - [`statistics`]: Dataset-level basic statistics
//! - [`report`]: Report types, sections and the report model
//! - [`pipeline`]: Background load → analyze → render jobs with progress
//! - [`ffi`]: C FFI bindings (JSON reports, auto-generated C header via cbindgen)
//! - [`config`]: Analysis thresholds, loadable from TOML
//! - [`logging`]: `tracing` subscriber setup
//! - [`error`]: Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_report::ingest::CsvLoader;
//! use u_report::report::{generate_report, ReportType, SectionContent};
//!
//! let csv = "id,name\n1,a\n2,b\n3,c\n2,b\n";
//! let table = CsvLoader::new().load_str(csv).unwrap();
//! let report = generate_report(&table, ReportType::Summary);
//!
//! assert_eq!(report.title, "Data Summary Report");
//! let SectionContent::Overview(overview) = &report.sections[0].content else {
//!     unreachable!()
//! };
//! assert_eq!(overview.data_quality.duplicate_rows, 1);
//! assert_eq!(overview.data_quality.quality_score, 87.5);
//! ```

pub mod classify;
pub mod column_analysis;
pub mod config;
pub mod correlation;
pub mod error;
pub mod ffi;
pub mod ingest;
pub mod logging;
pub mod outliers;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod statistics;
pub mod table;

pub use error::ReportError;
pub use report::{generate_report, generate_report_with, ReportModel, ReportType};
pub use table::{Column, ColumnKind, Table, Value};
