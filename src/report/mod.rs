//! Migration report: the run's externally consumed index of what was
//! generated and what still needs a human.
//!
//! Compilation is pure aggregation over earlier stage outputs. Tiers and
//! mappings are read, never recomputed.

pub mod diff;
pub mod markdown;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{Classification, ComplexityTier};
use crate::error::WarningKind;
use crate::inventory::{ComponentDetail, ComponentKind, Inventory};
use crate::resolve::{ComponentResolution, MappingRule};
use crate::synth::{ArtifactType, GeneratedArtifact};

/// File name of the machine-readable report inside the output directory.
pub const REPORT_JSON: &str = "migration_report.json";
/// Path of the markdown report inside the output directory.
pub const REPORT_MARKDOWN: &str = "docs/migration_report.md";

/// Fixed follow-up steps after generation.
pub const NEXT_STEPS: [(&str, &str); 5] = [
    (
        "Review Generated ESQL",
        "Check generated compute modules against the legacy map logic, especially unresolved fields.",
    ),
    (
        "Test Message Flows",
        "Drive each flow with representative production messages and compare outputs.",
    ),
    (
        "Database Configuration",
        "Create the data source used by enrichment and database modules and load reference tables.",
    ),
    (
        "Business Logic Validation",
        "Confirm ported custom logic and enrichment lookups with the business owners.",
    ),
    (
        "Performance Testing",
        "Measure throughput with production data volumes before cut-over.",
    ),
];

/// Fixed deployment checklist.
pub const DEPLOYMENT_CHECKLIST: [&str; 6] = [
    "Import project into ACE Toolkit",
    "Configure database connections",
    "Test all message flows",
    "Validate business logic",
    "Performance test with production data volumes",
    "Deploy to integration server",
];

/// Identifying metadata for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMeta {
    /// Unique run identifier.
    pub run_id: String,
    /// When the run started.
    pub generated_at: DateTime<Utc>,
    /// Project name from the hints.
    pub project: String,
}

/// Aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of components in the inventory.
    pub components_total: usize,
    /// Component count per kind label, zero-filled.
    pub components_by_kind: BTreeMap<String, usize>,
    /// Component count per tier label, zero-filled.
    pub components_by_tier: BTreeMap<String, usize>,
    /// Number of generated artifacts.
    pub artifacts_total: usize,
    /// Artifact count per type label, zero-filled.
    pub artifacts_by_type: BTreeMap<String, usize>,
    /// Total bytes across all artifacts.
    pub total_bytes: u64,
    /// Recorded non-fatal conditions.
    pub warnings: usize,
}

/// Value copy of one component's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    /// Component name.
    pub name: String,
    /// Kind label.
    pub kind: ComponentKind,
    /// Assigned tier.
    pub tier: ComplexityTier,
    /// Artifacts generated for it.
    pub artifacts: usize,
}

/// Value copy of one generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSummary {
    /// Logical name.
    pub logical_name: String,
    /// Artifact type.
    pub artifact_type: ArtifactType,
    /// Path relative to the output directory.
    pub target_path: String,
    /// Rendered size.
    pub size_bytes: u64,
    /// Originating component, if any.
    pub source_component: Option<String>,
}

impl From<&GeneratedArtifact> for ArtifactSummary {
    fn from(artifact: &GeneratedArtifact) -> Self {
        Self {
            logical_name: artifact.logical_name().to_string(),
            artifact_type: artifact.artifact_type(),
            target_path: artifact.target_path().to_string(),
            size_bytes: artifact.size_bytes(),
            source_component: artifact.source_component().map(String::from),
        }
    }
}

/// A known-limitations entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limitation {
    /// Affected component.
    pub component: String,
    /// Affected target field, for field-level entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Category.
    pub kind: WarningKind,
    /// What needs attention.
    pub message: String,
}

/// A recommended next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short title.
    pub title: String,
    /// What to do.
    pub detail: String,
}

/// The terminal aggregate of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Run identifier.
    pub run_id: String,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Version of the generator.
    pub tool_version: String,
    /// Project name.
    pub project: String,
    /// Aggregate counts.
    pub summary: Summary,
    /// Per-component outcomes in inventory order.
    pub components: Vec<ComponentSummary>,
    /// Artifacts in emission order.
    pub artifacts: Vec<ArtifactSummary>,
    /// Known limitations in component order.
    pub limitations: Vec<Limitation>,
    /// Fixed next steps.
    pub recommendations: Vec<Recommendation>,
    /// Fixed deployment checklist.
    pub checklist: Vec<String>,
}

/// Builds the report from the outputs of every earlier stage.
///
/// `classifications` and `resolutions` are matched to components by name;
/// `artifacts` must already be in emission order.
#[must_use]
pub fn compile(
    inventory: &Inventory,
    classifications: &[Classification],
    resolutions: &[ComponentResolution],
    artifacts: &[GeneratedArtifact],
    meta: &RunMeta,
) -> MigrationReport {
    let tiers: HashMap<&str, ComplexityTier> = classifications
        .iter()
        .map(|c| (c.component.as_str(), c.tier))
        .collect();
    let resolved: HashMap<&str, &ComponentResolution> = resolutions
        .iter()
        .map(|r| (r.component.as_str(), r))
        .collect();

    let mut summary = Summary {
        components_total: inventory.len(),
        components_by_kind: inventory
            .count_by_kind()
            .into_iter()
            .map(|(kind, n)| (kind.as_str().to_string(), n))
            .collect(),
        components_by_tier: ComplexityTier::ALL
            .iter()
            .map(|t| (t.as_str().to_string(), 0))
            .collect(),
        artifacts_total: artifacts.len(),
        artifacts_by_type: ArtifactType::ALL
            .iter()
            .map(|t| (t.as_str().to_string(), 0))
            .collect(),
        total_bytes: artifacts.iter().map(GeneratedArtifact::size_bytes).sum(),
        warnings: resolutions
            .iter()
            .map(ComponentResolution::warning_count)
            .sum(),
    };
    for artifact in artifacts {
        let label = artifact.artifact_type().as_str().to_string();
        *summary.artifacts_by_type.entry(label).or_default() += 1;
    }

    let mut components = Vec::with_capacity(inventory.len());
    let mut limitations = Vec::new();
    for component in inventory.components() {
        let name = component.name();
        let tier = tiers.get(name).copied().unwrap_or(ComplexityTier::Unknown);
        *summary
            .components_by_tier
            .entry(tier.as_str().to_string())
            .or_default() += 1;
        components.push(ComponentSummary {
            name: name.to_string(),
            kind: component.kind(),
            tier,
            artifacts: artifacts
                .iter()
                .filter(|a| a.source_component() == Some(name))
                .count(),
        });

        if tier == ComplexityTier::Complex && component.functoid_count() > 0 {
            limitations.push(Limitation {
                component: name.to_string(),
                field: None,
                kind: WarningKind::ManualReview,
                message: format!(
                    "Complex map with {} functoids may require manual review",
                    component.functoid_count()
                ),
            });
        }

        if let Some(resolution) = resolved.get(name) {
            limitations.extend(resolution.warnings.iter().map(|w| Limitation {
                component: w.component.clone(),
                field: None,
                kind: w.kind,
                message: w.message.clone(),
            }));
            for mapping in resolution.unresolved() {
                if let MappingRule::Unresolved { reason } = &mapping.rule {
                    limitations.push(Limitation {
                        component: name.to_string(),
                        field: Some(mapping.target_path.clone()),
                        kind: reason.warning_kind(),
                        message: format!(
                            "Field '{}' in {name} is unresolved ({reason}); manual review required",
                            mapping.target_path
                        ),
                    });
                }
            }
        }

        match component.detail() {
            ComponentDetail::CustomComponent { .. } => limitations.push(Limitation {
                component: name.to_string(),
                field: None,
                kind: WarningKind::ManualReview,
                message: "Custom .NET assemblies need manual conversion to Java compute nodes"
                    .to_string(),
            }),
            ComponentDetail::Pipeline { .. } => limitations.push(Limitation {
                component: name.to_string(),
                field: None,
                kind: WarningKind::ManualReview,
                message: "Pipeline components require custom node development".to_string(),
            }),
            _ => {}
        }
    }

    MigrationReport {
        run_id: meta.run_id.clone(),
        generated_at: meta.generated_at,
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        project: meta.project.clone(),
        summary,
        components,
        artifacts: artifacts.iter().map(ArtifactSummary::from).collect(),
        limitations,
        recommendations: NEXT_STEPS
            .iter()
            .map(|(title, detail)| Recommendation {
                title: (*title).to_string(),
                detail: (*detail).to_string(),
            })
            .collect(),
        checklist: DEPLOYMENT_CHECKLIST
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

impl MigrationReport {
    /// Limitations recorded against one component.
    pub fn limitations_for<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = &'a Limitation> {
        self.limitations
            .iter()
            .filter(move |l| l.component == component)
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
