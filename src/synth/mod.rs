//! Artifact synthesis: turns a classified, resolved component into the
//! concrete files the target runtime needs.
//!
//! Names and paths depend only on the component name, the artifact type and
//! the concern, so re-running over an unchanged inventory is a no-op diff.

pub mod builder;
mod esql;
mod project;
mod xsl;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::ComplexityTier;
use crate::inventory::{Component, ComponentDetail, Hints, LookupKind};
use crate::resolve::ComponentResolution;

pub use builder::ArtifactBuilder;

/// Kind of generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    /// Procedural (ESQL) compute module.
    ProceduralModule,
    /// XSL stylesheet.
    StyleTransform,
    /// Toolkit project descriptor.
    ProjectFile,
}

impl ArtifactType {
    /// Every type, in report order.
    pub const ALL: [Self; 3] = [
        Self::ProceduralModule,
        Self::StyleTransform,
        Self::ProjectFile,
    ];

    /// Stable label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProceduralModule => "ProceduralModule",
            Self::StyleTransform => "StyleTransform",
            Self::ProjectFile => "ProjectFile",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a procedural module is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    /// Main message processing.
    Main,
    /// Input validation.
    Validation,
    /// Error capture and logging.
    ErrorHandling,
    /// Database access for an orchestration.
    DatabaseOps,
    /// Ported custom code.
    BusinessLogic,
    /// One external lookup.
    Enrichment(LookupKind),
}

impl Concern {
    /// Suffix appended to the component name.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Validation => "Validation",
            Self::ErrorHandling => "ErrorHandling",
            Self::DatabaseOps => "DatabaseOps",
            Self::BusinessLogic => "BusinessLogic",
            Self::Enrichment(lookup) => lookup.concern(),
        }
    }

    /// One-line purpose for generated headers.
    #[must_use]
    pub fn purpose(self) -> &'static str {
        match self {
            Self::Main => "Primary message processing logic",
            Self::Validation => "Input message validation",
            Self::ErrorHandling => "Error processing and logging",
            Self::DatabaseOps => "Database operations and lookups",
            Self::BusinessLogic => "Business logic ported from custom code",
            Self::Enrichment(lookup) => lookup.purpose(),
        }
    }
}

/// An artifact generated from a single component. The project descriptor
/// belongs to the whole run and is not one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentArtifact {
    /// A procedural module for one concern.
    Module(Concern),
    /// The stylesheet transform of a map.
    Transform,
}

impl ComponentArtifact {
    /// Output type of the artifact.
    #[must_use]
    pub fn artifact_type(self) -> ArtifactType {
        match self {
            Self::Module(_) => ArtifactType::ProceduralModule,
            Self::Transform => ArtifactType::StyleTransform,
        }
    }

    /// Suffix appended to the component name.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Module(concern) => concern.suffix(),
            Self::Transform => "Transform",
        }
    }

    /// One-line purpose for generated headers.
    #[must_use]
    pub fn purpose(self) -> &'static str {
        match self {
            Self::Module(concern) => concern.purpose(),
            Self::Transform => "Schema-to-schema message transform",
        }
    }
}

/// Logical name of an artifact: `{ComponentName}_{Suffix}`.
#[must_use]
pub fn logical_name(component: &str, artifact: ComponentArtifact) -> String {
    format!("{component}_{}", artifact.suffix())
}

/// Output path, relative to the output directory, of an artifact.
#[must_use]
pub fn target_path(artifact_type: ArtifactType, logical_name: &str) -> String {
    match artifact_type {
        ArtifactType::ProceduralModule => format!("esql/{logical_name}.esql"),
        ArtifactType::StyleTransform => format!("transforms/xsl/{logical_name}.xsl"),
        ArtifactType::ProjectFile => ".project".to_string(),
    }
}

/// One emitted output unit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    artifact_type: ArtifactType,
    logical_name: String,
    target_path: String,
    source_component: Option<String>,
    body: String,
}

impl GeneratedArtifact {
    fn new(
        artifact_type: ArtifactType,
        logical_name: String,
        source_component: Option<String>,
        body: String,
    ) -> Self {
        let target_path = target_path(artifact_type, &logical_name);
        Self {
            artifact_type,
            logical_name,
            target_path,
            source_component,
            body,
        }
    }

    /// Artifact type.
    #[must_use]
    pub fn artifact_type(&self) -> ArtifactType {
        self.artifact_type
    }

    /// Logical name.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Path relative to the output directory.
    #[must_use]
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Rendered size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.body.len() as u64
    }

    /// Component this artifact was generated from; `None` for the project file.
    #[must_use]
    pub fn source_component(&self) -> Option<&str> {
        self.source_component.as_deref()
    }

    /// Rendered file contents.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Generates every artifact for one component.
///
/// Maps yield main, validation and error-handling modules, one module per
/// distinct enrichment lookup, and a style transform when the target schema
/// is known. Orchestrations yield artifacts only when they reference a map
/// or schema.
#[must_use]
pub fn synthesize(
    component: &Component,
    tier: ComplexityTier,
    resolution: &ComponentResolution,
) -> Vec<GeneratedArtifact> {
    let builder = ArtifactBuilder::new(component, tier, resolution);
    let module = |concern| builder.build(ComponentArtifact::Module(concern));

    match component.detail() {
        ComponentDetail::Map { .. } => {
            let mut artifacts = vec![
                module(Concern::Main),
                module(Concern::Validation),
                module(Concern::ErrorHandling),
            ];
            artifacts.extend(
                resolution
                    .enrichment_refs()
                    .into_iter()
                    .map(|l| module(Concern::Enrichment(l))),
            );
            if resolution.target.is_some() {
                artifacts.push(builder.build(ComponentArtifact::Transform));
            }
            artifacts
        }
        ComponentDetail::Orchestration { requires_database, .. } => {
            if resolution.data_references.is_empty() {
                return Vec::new();
            }
            let mut artifacts = vec![module(Concern::Main), module(Concern::ErrorHandling)];
            if *requires_database {
                artifacts.push(module(Concern::DatabaseOps));
            }
            artifacts
        }
        ComponentDetail::CustomComponent { business_logic: true } => {
            vec![module(Concern::BusinessLogic)]
        }
        ComponentDetail::CustomComponent { business_logic: false }
        | ComponentDetail::Schema { .. }
        | ComponentDetail::Pipeline { .. } => Vec::new(),
    }
}

/// Generates the run's single project descriptor.
#[must_use]
pub fn synthesize_project(hints: &Hints) -> GeneratedArtifact {
    GeneratedArtifact::new(
        ArtifactType::ProjectFile,
        hints.project.clone(),
        None,
        project::render(&hints.project, &hints.libraries),
    )
}
