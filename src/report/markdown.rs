//! Human-readable rendering of a [`MigrationReport`].

use super::MigrationReport;

/// Renders the report as markdown.
#[must_use]
pub fn render(report: &MigrationReport) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        format!("# Migration Report: {}", report.project),
        String::new(),
        format!("- Run: `{}`", report.run_id),
        format!("- Generated: {}", report.generated_at.to_rfc3339()),
        format!("- Generator version: {}", report.tool_version),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Components analyzed: {}", summary.components_total),
        format!("- Artifacts generated: {}", summary.artifacts_total),
        format!("- Total size: {} bytes", summary.total_bytes),
        format!("- Warnings recorded: {}", summary.warnings),
        String::new(),
    ];

    lines.extend(count_table("Component kind", &summary.components_by_kind));
    lines.extend(count_table("Complexity tier", &summary.components_by_tier));
    lines.extend(count_table("Artifact type", &summary.artifacts_by_type));

    lines.push("## Components".to_string());
    lines.push(String::new());
    if report.components.is_empty() {
        lines.push("No components in inventory.".to_string());
    } else {
        lines.push("| Component | Kind | Tier | Artifacts |".to_string());
        lines.push("|---|---|---|---|".to_string());
        for c in &report.components {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                cell(&c.name),
                c.kind,
                c.tier,
                c.artifacts
            ));
        }
    }
    lines.push(String::new());

    lines.push("## Generated Artifacts".to_string());
    lines.push(String::new());
    if report.artifacts.is_empty() {
        lines.push("No artifacts generated.".to_string());
    } else {
        lines.push("| Name | Type | Path | Size (bytes) | Source |".to_string());
        lines.push("|---|---|---|---|---|".to_string());
        for a in &report.artifacts {
            lines.push(format!(
                "| {} | {} | `{}` | {} | {} |",
                cell(&a.logical_name),
                a.artifact_type,
                a.target_path,
                a.size_bytes,
                a.source_component
                    .as_deref()
                    .map_or_else(|| "-".to_string(), cell),
            ));
        }
    }
    lines.push(String::new());

    lines.push("## Known Limitations".to_string());
    lines.push(String::new());
    if report.limitations.is_empty() {
        lines.push("None recorded.".to_string());
    }
    for l in &report.limitations {
        match &l.field {
            Some(field) => lines.push(format!(
                "- **{}** `{field}` ({}): {}",
                l.component,
                l.kind.as_str(),
                l.message
            )),
            None => lines.push(format!(
                "- **{}** ({}): {}",
                l.component,
                l.kind.as_str(),
                l.message
            )),
        }
    }
    lines.push(String::new());

    lines.push("## Next Steps".to_string());
    lines.push(String::new());
    for (i, r) in report.recommendations.iter().enumerate() {
        lines.push(format!("{}. **{}**: {}", i + 1, r.title, r.detail));
    }
    lines.push(String::new());

    lines.push("## Deployment Checklist".to_string());
    lines.push(String::new());
    lines.extend(report.checklist.iter().map(|step| format!("- [ ] {step}")));
    lines.push(String::new());

    lines.join("\n")
}

fn count_table(label: &str, counts: &std::collections::BTreeMap<String, usize>) -> Vec<String> {
    let mut out = vec![format!("| {label} | Count |"), "|---|---|".to_string()];
    out.extend(counts.iter().map(|(k, n)| format!("| {k} | {n} |")));
    out.push(String::new());
    out
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;
    use crate::report::{Limitation, Recommendation, Summary};
    use chrono::{DateTime, Utc};

    fn report() -> MigrationReport {
        MigrationReport {
            run_id: "run-0001".into(),
            generated_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            tool_version: "0.1.0".into(),
            project: "Freight".into(),
            summary: Summary::default(),
            components: Vec::new(),
            artifacts: Vec::new(),
            limitations: vec![Limitation {
                component: "Wide_Map".into(),
                field: Some("Wide/A".into()),
                kind: WarningKind::ManualReview,
                message: "Field 'Wide/A' is unresolved".into(),
            }],
            recommendations: vec![Recommendation {
                title: "Review Generated ESQL".into(),
                detail: "Check it.".into(),
            }],
            checklist: vec!["Configure database connections".into()],
        }
    }

    #[test]
    fn renders_every_section() {
        let md = render(&report());
        for heading in [
            "# Migration Report: Freight",
            "## Summary",
            "## Generated Artifacts",
            "## Known Limitations",
            "## Next Steps",
            "## Deployment Checklist",
        ] {
            assert!(md.contains(heading), "missing {heading}");
        }
        assert!(md.contains("- Generated: 2025-01-01T00:00:00+00:00"));
    }

    #[test]
    fn lists_field_limitations_and_checklist() {
        let md = render(&report());
        assert!(md.contains(
            "- **Wide_Map** `Wide/A` (manual_review): Field 'Wide/A' is unresolved"
        ));
        assert!(md.contains("1. **Review Generated ESQL**: Check it."));
        assert!(md.contains("- [ ] Configure database connections"));
        assert!(md.contains("No artifacts generated."));
    }

    #[test]
    fn pipes_are_escaped_in_tables() {
        assert_eq!(cell("a|b"), "a\\|b");
    }
}
