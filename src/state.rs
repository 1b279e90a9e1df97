use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::data::classify::{init_classification, ColumnClassification, Edit};
use crate::data::decoder::decode;
use crate::data::error::PipelineError;
use crate::data::model::{CellValue, Table};
use crate::data::preview::{build_preview, Preview};
use crate::data::render::{render, ChartSpec, Selection};
use crate::data::select::{category_options, metric_options};

// ---------------------------------------------------------------------------
// Events: one per user action
// ---------------------------------------------------------------------------

/// A user action. Each one produces exactly one new [`Session`] revision.
#[derive(Debug, Clone)]
pub enum Event {
    /// A file was picked or dropped.
    Upload { filename: String, bytes: Vec<u8> },
    /// The "Parse Data" confirmation after a successful upload.
    Proceed,
    /// Type changes and/or column deletions from the classification table.
    Edit(Vec<Edit>),
    /// The stocks chosen for plotting.
    SelectCategories(Vec<CellValue>),
    /// The numerical column chosen for the y axis.
    SelectMetric(Option<String>),
}

/// How far through the workflow the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing uploaded yet.
    Empty,
    /// A table is decoded; waiting for the user to proceed.
    Uploaded,
    /// The classification table is shown. Preview and graph follow from it.
    Classifying,
}

/// The decoded upload. Shared between revisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub filename: String,
    pub table: Table,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The whole workflow state, independent of rendering.
///
/// A `Session` is never mutated in place: [`Session::apply`] returns the next
/// revision and the UI swaps it in. Derived slices (`preview`, `chart`) are
/// recomputed from the upload, classification and selection on every
/// transition that can affect them.
#[derive(Debug, Clone)]
pub struct Session {
    revision: u64,
    config: Arc<PipelineConfig>,
    upload: Option<Arc<Upload>>,
    stage: Stage,
    classification: ColumnClassification,
    selection: Selection,
    preview: Option<Result<Preview, PipelineError>>,
    chart: Option<Result<ChartSpec, PipelineError>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            revision: 0,
            config: Arc::new(config),
            upload: None,
            stage: Stage::Empty,
            classification: ColumnClassification::default(),
            selection: Selection::default(),
            preview: None,
            chart: None,
        }
    }

    /// Compute the next revision for `event`.
    ///
    /// On `Err` the caller keeps the current revision, so a failed upload
    /// leaves every earlier stage as it was.
    pub fn apply(&self, event: Event) -> Result<Session, PipelineError> {
        let mut next = match event {
            Event::Upload { filename, bytes } => self.with_upload(filename, &bytes)?,
            Event::Proceed => self.proceed()?,
            Event::Edit(edits) => self.with_edits(&edits),
            Event::SelectCategories(values) => {
                let mut next = self.clone();
                next.selection.categories = values.into_iter().collect();
                next.rechart();
                next
            }
            Event::SelectMetric(metric) => {
                let mut next = self.clone();
                next.selection.metric = metric;
                next.rechart();
                next
            }
        };
        next.revision = self.revision + 1;
        Ok(next)
    }

    fn with_upload(&self, filename: String, bytes: &[u8]) -> Result<Session, PipelineError> {
        let table = decode(bytes, &filename)?;
        let mut next = Session::new((*self.config).clone());
        next.upload = Some(Arc::new(Upload { filename, table }));
        next.stage = Stage::Uploaded;
        Ok(next)
    }

    fn proceed(&self) -> Result<Session, PipelineError> {
        let upload = self.upload.as_ref().ok_or(PipelineError::NoUpload)?;
        // Parsing again starts the classification over, deleted columns included.
        let mut next = self.clone();
        next.classification = init_classification(&upload.table);
        next.stage = Stage::Classifying;
        next.repreview();
        log::info!(
            "Classifying {} columns of '{}'",
            next.classification.len(),
            upload.filename
        );
        Ok(next)
    }

    fn with_edits(&self, edits: &[Edit]) -> Session {
        let mut next = self.clone();
        if self.stage != Stage::Classifying {
            log::warn!("Ignoring {} classification edits before parsing", edits.len());
            return next;
        }
        next.classification = self.classification.apply_edits(edits);
        next.repreview();
        next
    }

    /// Rebuild the preview from the classification, then the chart.
    fn repreview(&mut self) {
        self.preview = match &self.upload {
            Some(upload) if self.classification.is_complete() => Some(build_preview(
                &upload.table,
                &self.classification,
                &self.config.category_column,
            )),
            _ => None,
        };

        if let Some(Err(e)) = &self.preview {
            log::warn!("Preview unavailable: {e}");
        }

        // Drop selections the new preview no longer offers.
        let categories = self.category_options();
        let metrics = self.metric_options();
        self.selection.categories.retain(|v| categories.contains(v));
        if let Some(m) = &self.selection.metric {
            if !metrics.contains(m) {
                self.selection.metric = None;
            }
        }

        self.rechart();
    }

    /// Rebuild the chart from the preview and selection.
    fn rechart(&mut self) {
        self.chart = match (&self.upload, self.preview()) {
            (Some(upload), Some(preview)) if self.selection.is_ready() => Some(render(
                &upload.table,
                preview,
                &self.selection,
                &self.config.x_column,
            )),
            _ => None,
        };
    }

    // -- Read-only views for the UI --

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_deref()
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The preview, if the classification is complete and it succeeded.
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// Why the preview could not be built, if it was attempted and failed.
    pub fn preview_error(&self) -> Option<&PipelineError> {
        self.preview.as_ref().and_then(|r| r.as_ref().err())
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        self.chart.as_ref().and_then(|r| r.as_ref().ok())
    }

    pub fn chart_error(&self) -> Option<&PipelineError> {
        self.chart.as_ref().and_then(|r| r.as_ref().err())
    }

    /// Stocks offered in the category picker.
    pub fn category_options(&self) -> Vec<CellValue> {
        self.preview()
            .map(|p| category_options(&p.table, &p.category_column))
            .unwrap_or_default()
    }

    /// Columns offered in the metric picker.
    pub fn metric_options(&self) -> Vec<String> {
        self.preview()
            .map(|p| metric_options(&p.numerical_columns))
            .unwrap_or_default()
    }
}
