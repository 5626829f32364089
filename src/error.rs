//! Error and warning types for the generation pipeline.
//!
//! `PipelineError` is fatal: the run halts and nothing is written.
//! `Warning` is recorded against a component and always lands in the
//! report's known-limitations section.

use serde::{Deserialize, Serialize};

use crate::pipeline::Stage;

/// Fatal pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The inventory names a kind outside the known set.
    #[error("component '{component}' has unrecognized kind '{kind}'")]
    InvalidComponentKind {
        /// Offending component.
        component: String,
        /// Kind label as written.
        kind: String,
    },

    /// Two components share a name, so their artifact names would collide.
    #[error("component name '{0}' appears more than once in the inventory")]
    DuplicateComponent(String),

    /// A record is structurally unusable (e.g. empty name).
    #[error("invalid inventory record: {0}")]
    InvalidRecord(String),

    /// A stage was entered out of order.
    #[error("stage {attempted} cannot run while the pipeline is {current}")]
    StageOrder {
        /// Stage the run has completed.
        current: Stage,
        /// Stage that was requested.
        attempted: Stage,
    },

    /// Cancellation was observed at a stage boundary.
    #[error("run cancelled before stage {0}")]
    Cancelled(Stage),

    /// An input document could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Document path.
        path: String,
        /// Underlying error.
        message: String,
    },

    /// An input document is not valid YAML/JSON for its schema.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Document path.
        path: String,
        /// Underlying error.
        message: String,
    },

    /// An output file could not be written.
    #[error("failed to write {path}: {message}")]
    Write {
        /// Output path.
        path: String,
        /// Underlying error.
        message: String,
    },

    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Category of a non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// More than one source candidate matched a target field.
    AmbiguousMapping,
    /// A map lacks the schema reference needed for a transform.
    MissingSchemaReference,
    /// An enrichment hint names a lookup the generator does not know.
    EnrichmentRefUnresolvable,
    /// Something needs a human to look at it before deployment.
    ManualReview,
}

impl WarningKind {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AmbiguousMapping => "ambiguous_mapping",
            Self::MissingSchemaReference => "missing_schema_reference",
            Self::EnrichmentRefUnresolvable => "enrichment_ref_unresolvable",
            Self::ManualReview => "manual_review",
        }
    }
}

/// A recorded non-fatal condition attached to a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Name of the affected component.
    pub component: String,
    /// What went wrong.
    pub kind: WarningKind,
    /// Human-readable explanation.
    pub message: String,
}

impl Warning {
    /// Creates a warning for `component`.
    pub fn new(
        component: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            kind,
            message: message.into(),
        }
    }
}
