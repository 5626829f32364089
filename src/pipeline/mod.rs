//! Run orchestration: the stage machine, cancellation, and the end-to-end
//! generate operation.

mod run;
pub mod workers;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::error::{PipelineError, PipelineResult};

pub use run::{generate, previous_report, run, write_outputs, GenerateRequest, Generation};

/// Stages of a run, in the only order they may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Nothing loaded yet.
    Initialized,
    /// Inventory and hints loaded and validated.
    Inventoried,
    /// Every component has a tier.
    Classified,
    /// Every component has its mappings.
    Resolved,
    /// Every artifact has been rendered.
    Synthesized,
    /// The report has been compiled.
    Reported,
    /// Output written; the run is over.
    Terminal,
}

impl Stage {
    /// The stage that must follow this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Initialized => Some(Self::Inventoried),
            Self::Inventoried => Some(Self::Classified),
            Self::Classified => Some(Self::Resolved),
            Self::Resolved => Some(Self::Synthesized),
            Self::Synthesized => Some(Self::Reported),
            Self::Reported => Some(Self::Terminal),
            Self::Terminal => None,
        }
    }

    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Inventoried => "inventoried",
            Self::Classified => "classified",
            Self::Resolved => "resolved",
            Self::Synthesized => "synthesized",
            Self::Reported => "reported",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level cancellation flag shared between the caller and the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the next stage boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tracks the current stage of a run.
#[derive(Debug)]
pub struct Pipeline {
    stage: Stage,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Starts a run in [`Stage::Initialized`].
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            stage: Stage::Initialized,
            cancel,
        }
    }

    /// The last stage completed.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Fails if cancellation was requested, naming the stage that would have
    /// been entered next.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Cancelled`] once the token is cancelled.
    pub fn check_cancelled(&self) -> PipelineResult<()> {
        if self.cancel.is_cancelled() {
            let stage = self.stage.next().unwrap_or(self.stage);
            info!(stage = %stage, "cancellation observed");
            return Err(PipelineError::Cancelled(stage));
        }
        Ok(())
    }

    /// Marks `to` as completed.
    ///
    /// Entering [`Stage::Terminal`] is never cancelled: by then the output has
    /// been written, and reporting a cancellation would misdescribe it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StageOrder`] unless `to` directly follows the
    /// current stage, and [`PipelineError::Cancelled`] if cancellation was
    /// requested.
    pub fn advance(&mut self, to: Stage) -> PipelineResult<()> {
        if self.stage.next() != Some(to) {
            return Err(PipelineError::StageOrder {
                current: self.stage,
                attempted: to,
            });
        }
        if to != Stage::Terminal {
            self.check_cancelled()?;
        }
        info!(stage = %to, "stage complete");
        self.stage = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_advance_in_order() {
        let mut pipeline = Pipeline::new(CancellationToken::new());
        let mut stage = Stage::Initialized;
        while let Some(next) = stage.next() {
            pipeline.advance(next).unwrap();
            stage = next;
        }
        assert_eq!(pipeline.stage(), Stage::Terminal);
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut pipeline = Pipeline::new(CancellationToken::new());
        pipeline.advance(Stage::Inventoried).unwrap();
        let err = pipeline.advance(Stage::Resolved).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StageOrder { current: Stage::Inventoried, attempted: Stage::Resolved }
        ));
        assert_eq!(pipeline.stage(), Stage::Inventoried);
    }

    #[test]
    fn no_loop_back() {
        let mut pipeline = Pipeline::new(CancellationToken::new());
        pipeline.advance(Stage::Inventoried).unwrap();
        pipeline.advance(Stage::Classified).unwrap();
        assert!(pipeline.advance(Stage::Inventoried).is_err());
    }

    #[test]
    fn cancellation_stops_at_next_boundary() {
        let token = CancellationToken::new();
        let mut pipeline = Pipeline::new(token.clone());
        pipeline.advance(Stage::Inventoried).unwrap();
        token.cancel();
        let err = pipeline.advance(Stage::Classified).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled(Stage::Classified)));
        assert_eq!(err.to_string(), "run cancelled before stage classified");
    }

    #[test]
    fn terminal_is_entered_despite_late_cancellation() {
        let token = CancellationToken::new();
        let mut pipeline = Pipeline::new(token.clone());
        let mut stage = Stage::Initialized;
        while stage != Stage::Reported {
            stage = stage.next().unwrap();
            pipeline.advance(stage).unwrap();
        }
        token.cancel();
        assert!(matches!(
            pipeline.check_cancelled(),
            Err(PipelineError::Cancelled(Stage::Terminal))
        ));
        pipeline.advance(Stage::Terminal).unwrap();
        assert_eq!(pipeline.stage(), Stage::Terminal);
    }
}
