//! Shared artifact construction: every generated file goes through
//! [`ArtifactBuilder::build`] so headers, naming and sizing stay uniform.

use crate::classify::ComplexityTier;
use crate::inventory::Component;
use crate::resolve::ComponentResolution;

use super::{esql, logical_name, xsl, ComponentArtifact, GeneratedArtifact};

/// Name of the generating tool, stamped into every header.
pub const GENERATOR: &str = "brokergen";

/// Provenance block written at the top of each generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Logical name of the artifact.
    pub logical_name: String,
    /// Originating component, `None` for project-level files.
    pub component: Option<String>,
    /// Complexity tier of the originating component.
    pub tier: Option<ComplexityTier>,
    /// One-line purpose.
    pub purpose: String,
}

impl Header {
    /// Header lines without comment markers.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.logical_name.clone(),
            format!("Generated by {GENERATOR} {}", env!("CARGO_PKG_VERSION")),
            format!(
                "Source component: {}",
                self.component.as_deref().unwrap_or("(project)")
            ),
            format!(
                "Complexity tier: {}",
                self.tier.map_or("n/a", ComplexityTier::as_str)
            ),
            format!("Purpose: {}", self.purpose),
        ]
    }
}

/// Builds artifacts for one component from its resolution.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactBuilder<'a> {
    pub(super) component: &'a Component,
    pub(super) tier: ComplexityTier,
    pub(super) resolution: &'a ComponentResolution,
}

impl<'a> ArtifactBuilder<'a> {
    /// Creates a builder for `component`.
    #[must_use]
    pub fn new(
        component: &'a Component,
        tier: ComplexityTier,
        resolution: &'a ComponentResolution,
    ) -> Self {
        Self {
            component,
            tier,
            resolution,
        }
    }

    /// Renders one artifact of the component.
    ///
    /// The project descriptor is run-wide and comes from
    /// [`super::synthesize_project`] instead.
    #[must_use]
    pub fn build(&self, artifact: ComponentArtifact) -> GeneratedArtifact {
        let name = logical_name(self.component.name(), artifact);
        let header = Header {
            logical_name: name.clone(),
            component: Some(self.component.name().to_string()),
            tier: Some(self.tier),
            purpose: artifact.purpose().to_string(),
        };
        let body = match artifact {
            ComponentArtifact::Module(concern) => esql::render(&header, self, concern),
            ComponentArtifact::Transform => xsl::render(&header, self),
        };
        GeneratedArtifact::new(
            artifact.artifact_type(),
            name,
            Some(self.component.name().to_string()),
            body,
        )
    }
}
