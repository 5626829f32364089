//! Reads inventory and hints documents through the filesystem port.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::record::InventoryDocument;
use super::{Hints, Inventory};
use crate::context::ServiceContext;
use crate::error::{PipelineError, PipelineResult};

/// Document encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// Anything else.
    Yaml,
}

impl DocumentFormat {
    /// Picks the format for `path`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

/// Loads and validates the component inventory at `path`.
///
/// # Errors
///
/// Returns an error if the document cannot be read or parsed, names an
/// unknown component kind, or repeats a component name.
pub fn load_inventory(ctx: &ServiceContext, path: &Path) -> PipelineResult<Inventory> {
    let document: InventoryDocument = read_document(ctx, path)?;
    debug!(
        path = %path.display(),
        records = document.components.len(),
        "inventory document read"
    );
    Inventory::try_from(document)
}

/// Loads the hints document at `path`.
///
/// # Errors
///
/// Returns an error if the document cannot be read or parsed.
pub fn load_hints(ctx: &ServiceContext, path: &Path) -> PipelineResult<Hints> {
    let hints: Hints = read_document(ctx, path)?;
    debug!(
        path = %path.display(),
        aliases = hints.aliases.len(),
        enrichments = hints.enrichments.len(),
        "hints document read"
    );
    Ok(hints)
}

fn read_document<T: DeserializeOwned>(ctx: &ServiceContext, path: &Path) -> PipelineResult<T> {
    let display = path.display().to_string();
    let contents = ctx
        .fs
        .read_to_string(path)
        .map_err(|e| PipelineError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;
    let parsed = match DocumentFormat::for_path(path) {
        DocumentFormat::Json => serde_json::from_str(&contents).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| PipelineError::Parse {
        path: display,
        message,
    })
}
