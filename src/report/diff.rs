//! Differences between the artifacts of two runs.

use super::{ArtifactSummary, MigrationReport};

/// Differences between a previous and a current report.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct ReportDiff {
    /// Artifact paths present now but not before.
    pub added: Vec<String>,
    /// Artifact paths present before but not now.
    pub removed: Vec<String>,
    /// Artifacts whose rendered size changed.
    pub resized: Vec<SizeChange>,
}

/// Size change of one artifact.
#[derive(Debug, PartialEq, Eq)]
pub struct SizeChange {
    /// Artifact path.
    pub path: String,
    /// Previous size in bytes.
    pub old: u64,
    /// Current size in bytes.
    pub new: u64,
}

impl ReportDiff {
    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.resized.is_empty()
    }
}

/// Compares artifact listings by target path.
#[must_use]
pub fn diff_reports(old: &MigrationReport, new: &MigrationReport) -> ReportDiff {
    let added = new
        .artifacts
        .iter()
        .filter(|a| find(&old.artifacts, &a.target_path).is_none())
        .map(|a| a.target_path.clone())
        .collect();
    let removed = old
        .artifacts
        .iter()
        .filter(|a| find(&new.artifacts, &a.target_path).is_none())
        .map(|a| a.target_path.clone())
        .collect();
    let resized = new
        .artifacts
        .iter()
        .filter_map(|a| {
            let old_size = find(&old.artifacts, &a.target_path)?;
            (old_size != a.size_bytes).then(|| SizeChange {
                path: a.target_path.clone(),
                old: old_size,
                new: a.size_bytes,
            })
        })
        .collect();

    ReportDiff {
        added,
        removed,
        resized,
    }
}

fn find(list: &[ArtifactSummary], path: &str) -> Option<u64> {
    list.iter()
        .find(|a| a.target_path == path)
        .map(|a| a.size_bytes)
}

/// Formats a diff for terminal display.
#[must_use]
pub fn format_diff(diff: &ReportDiff) -> String {
    if diff.is_empty() {
        return "No artifact changes since last run.".to_string();
    }

    let mut lines = Vec::new();
    if !diff.added.is_empty() {
        lines.push("Added artifacts:".to_string());
        lines.extend(diff.added.iter().map(|p| format!("  + {p}")));
    }
    if !diff.removed.is_empty() {
        lines.push("Removed artifacts:".to_string());
        lines.extend(diff.removed.iter().map(|p| format!("  - {p}")));
    }
    if !diff.resized.is_empty() {
        lines.push("Changed artifacts:".to_string());
        for c in &diff.resized {
            lines.push(format!("  ~ {} ({} -> {} bytes)", c.path, c.old, c.new));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Summary;
    use crate::synth::ArtifactType;
    use chrono::Utc;

    fn report(artifacts: &[(&str, u64)]) -> MigrationReport {
        MigrationReport {
            run_id: "run".into(),
            generated_at: Utc::now(),
            tool_version: "0.1.0".into(),
            project: "P".into(),
            summary: Summary::default(),
            components: Vec::new(),
            artifacts: artifacts
                .iter()
                .map(|(path, size)| ArtifactSummary {
                    logical_name: (*path).to_string(),
                    artifact_type: ArtifactType::ProceduralModule,
                    target_path: (*path).to_string(),
                    size_bytes: *size,
                    source_component: None,
                })
                .collect(),
            limitations: Vec::new(),
            recommendations: Vec::new(),
            checklist: Vec::new(),
        }
    }

    #[test]
    fn detects_added_and_removed() {
        let old = report(&[("esql/A_Main.esql", 10), ("esql/B_Main.esql", 10)]);
        let new = report(&[("esql/A_Main.esql", 10), ("esql/C_Main.esql", 12)]);
        let d = diff_reports(&old, &new);
        assert_eq!(d.added, vec!["esql/C_Main.esql"]);
        assert_eq!(d.removed, vec!["esql/B_Main.esql"]);
        assert!(d.resized.is_empty());
    }

    #[test]
    fn detects_size_change() {
        let old = report(&[("esql/A_Main.esql", 10)]);
        let new = report(&[("esql/A_Main.esql", 14)]);
        let d = diff_reports(&old, &new);
        assert_eq!(
            d.resized,
            vec![SizeChange {
                path: "esql/A_Main.esql".into(),
                old: 10,
                new: 14,
            }]
        );
        assert!(format_diff(&d).contains("~ esql/A_Main.esql (10 -> 14 bytes)"));
    }

    #[test]
    fn unchanged_runs_report_no_changes() {
        let r = report(&[("esql/A_Main.esql", 10)]);
        let d = diff_reports(&r, &r);
        assert!(d.is_empty());
        assert_eq!(format_diff(&d), "No artifact changes since last run.");
    }
}
