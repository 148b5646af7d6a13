//! Background report generation with progress events.
//!
//! A [`ReportJob`] runs three stages on a worker thread: a loader closure
//! producing a [`Table`], the analysis itself, and a renderer closure
//! consuming the [`ReportModel`]. Progress is published over a `crossbeam`
//! channel as [`ProgressEvent`]s with a completion fraction in `[0, 1]`.
//!
//! There is no cancellation. A caller that loses interest drops the
//! [`JobHandle`]; the worker keeps going and ignores the disconnected
//! channel.
//!
//! ```
//! use u_report::pipeline::{ProgressEvent, ReportJob};
//! use u_report::report::ReportType;
//! use u_report::table::{Column, Table};
//!
//! let job = ReportJob::new(
//!     || Table::from_columns(vec![("x", Column::numeric_from([Some(1.0), Some(2.0)]))]),
//!     |model| Ok(model.title.clone()),
//! )
//! .report_type(ReportType::Overview);
//!
//! let handle = job.spawn();
//! let events: Vec<ProgressEvent> = handle.progress().iter().collect();
//! assert_eq!(events.last(), Some(&ProgressEvent::Complete));
//! assert_eq!(handle.join().unwrap(), "Data Overview Report");
//! ```

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use crate::config::AnalysisConfig;
use crate::error::ReportError;
use crate::report::{generate_report_with, ReportModel, ReportType};
use crate::table::Table;

/// Progress of a running job.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Loading,
    Processing,
    Rendering,
    Complete,
    /// The job stopped; carries the stage that failed.
    Failed { stage: String, message: String },
}

impl ProgressEvent {
    /// Completion fraction in `[0, 1]` reached when this event is sent.
    pub fn fraction(&self) -> f64 {
        match self {
            Self::Loading => 0.2,
            Self::Processing => 0.4,
            Self::Rendering => 0.8,
            Self::Complete | Self::Failed { .. } => 1.0,
        }
    }
}

type Loader = Box<dyn FnOnce() -> Result<Table, ReportError> + Send>;
type Renderer<T> = Box<dyn FnOnce(&ReportModel) -> Result<T, ReportError> + Send>;

/// A load → analyze → render job.
pub struct ReportJob<T> {
    loader: Loader,
    renderer: Renderer<T>,
    report_type: ReportType,
    config: AnalysisConfig,
}

impl<T: Send + 'static> ReportJob<T> {
    /// Creates a summary-report job with default settings.
    pub fn new<L, R>(loader: L, renderer: R) -> Self
    where
        L: FnOnce() -> Result<Table, ReportError> + Send + 'static,
        R: FnOnce(&ReportModel) -> Result<T, ReportError> + Send + 'static,
    {
        Self {
            loader: Box::new(loader),
            renderer: Box::new(renderer),
            report_type: ReportType::default(),
            config: AnalysisConfig::default(),
        }
    }

    pub fn report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the job on the current thread, reporting to `progress`.
    ///
    /// Loader and renderer failures are wrapped in
    /// [`ReportError::Pipeline`] naming the stage.
    pub fn run(self, progress: &Sender<ProgressEvent>) -> Result<T, ReportError> {
        let result = self.run_stages(progress);
        let event = match &result {
            Ok(_) => ProgressEvent::Complete,
            Err(ReportError::Pipeline { stage, message }) => ProgressEvent::Failed {
                stage: stage.clone(),
                message: message.clone(),
            },
            Err(other) => ProgressEvent::Failed {
                stage: "job".to_string(),
                message: other.to_string(),
            },
        };
        match &event {
            ProgressEvent::Failed { stage, message } => {
                tracing::warn!(stage = %stage, error = %message, "report job failed");
            }
            _ => tracing::info!("report job complete"),
        }
        // receiver may be gone
        let _ = progress.send(event);
        result
    }

    fn run_stages(self, progress: &Sender<ProgressEvent>) -> Result<T, ReportError> {
        let stage_failed = |stage: &str, e: ReportError| ReportError::Pipeline {
            stage: stage.to_string(),
            message: e.to_string(),
        };

        let _ = progress.send(ProgressEvent::Loading);
        tracing::info!("loading data");
        let table = (self.loader)().map_err(|e| stage_failed("loading", e))?;

        let _ = progress.send(ProgressEvent::Processing);
        tracing::info!(
            rows = table.row_count(),
            columns = table.column_count(),
            report_type = %self.report_type,
            "processing data"
        );
        let model = generate_report_with(&table, self.report_type, &self.config);

        let _ = progress.send(ProgressEvent::Rendering);
        tracing::info!(sections = model.sections.len(), "rendering report");
        (self.renderer)(&model).map_err(|e| stage_failed("rendering", e))
    }

    /// Runs the job on a new thread.
    pub fn spawn(self) -> JobHandle<T> {
        let (tx, rx) = channel::unbounded();
        let worker = thread::spawn(move || self.run(&tx));
        JobHandle {
            progress: rx,
            worker,
        }
    }
}

/// Handle to a spawned [`ReportJob`].
pub struct JobHandle<T> {
    progress: Receiver<ProgressEvent>,
    worker: JoinHandle<Result<T, ReportError>>,
}

impl<T> JobHandle<T> {
    /// Progress events. The channel disconnects when the job ends.
    pub fn progress(&self) -> &Receiver<ProgressEvent> {
        &self.progress
    }

    /// Returns `true` once the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the job's result.
    pub fn join(self) -> Result<T, ReportError> {
        self.worker.join().unwrap_or_else(|_| {
            Err(ReportError::Pipeline {
                stage: "worker".to_string(),
                message: "worker thread panicked".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use pretty_assertions::assert_eq;

    fn table() -> Result<Table, ReportError> {
        Table::from_columns(vec![
            ("a", Column::numeric_from([Some(1.0), Some(2.0), Some(3.0)])),
            ("b", Column::numeric_from([Some(2.0), Some(4.0), Some(6.0)])),
        ])
    }

    #[test]
    fn events_in_stage_order() {
        let handle = ReportJob::new(table, |model| Ok(model.sections.len())).spawn();
        let events: Vec<ProgressEvent> = handle.progress().iter().collect();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Loading,
                ProgressEvent::Processing,
                ProgressEvent::Rendering,
                ProgressEvent::Complete,
            ]
        );
        let fractions: Vec<f64> = events.iter().map(ProgressEvent::fraction).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(handle.join().unwrap(), 2);
    }

    #[test]
    fn report_type_and_config_reach_analysis() {
        let config = AnalysisConfig {
            sample_rows: 1,
            ..AnalysisConfig::default()
        };
        let handle = ReportJob::new(table, |model| Ok(model.clone()))
            .report_type(ReportType::Detailed)
            .config(config)
            .spawn();
        let model = handle.join().unwrap();
        assert_eq!(model.report_type, ReportType::Detailed);
        assert_eq!(model.title, "Detailed Data Analysis");
    }

    #[test]
    fn loader_failure_is_reported() {
        let handle = ReportJob::new(
            || Err(ReportError::Io("no such file".into())),
            |_| Ok(()),
        )
        .spawn();
        let events: Vec<ProgressEvent> = handle.progress().iter().collect();
        assert_eq!(events[0], ProgressEvent::Loading);
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::Failed { stage, .. }) if stage == "loading"
        ));
        let err = handle.join().unwrap_err();
        assert_eq!(
            err,
            ReportError::Pipeline {
                stage: "loading".into(),
                message: "I/O error: no such file".into()
            }
        );
    }

    #[test]
    fn renderer_failure_is_reported() {
        let job: ReportJob<()> = ReportJob::new(table, |_| {
            Err(ReportError::Config("renderer unavailable".into()))
        });
        let err = job.spawn().join().unwrap_err();
        assert!(matches!(err, ReportError::Pipeline { stage, .. } if stage == "rendering"));
    }

    #[test]
    fn dropped_receiver_does_not_stop_job() {
        let (tx, rx) = channel::unbounded();
        drop(rx);
        let result = ReportJob::new(table, |model| Ok(model.title.clone())).run(&tx);
        assert_eq!(result.unwrap(), "Data Summary Report");
    }

    #[test]
    fn worker_panic_becomes_error() {
        let job: ReportJob<()> = ReportJob::new(table, |_| panic!("renderer bug"));
        let err = job.spawn().join().unwrap_err();
        assert!(matches!(err, ReportError::Pipeline { stage, .. } if stage == "worker"));
    }
}
