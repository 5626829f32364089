//! `brokergen generate` command.

use std::path::{Path, PathBuf};

use crate::context::ServiceContext;
use crate::pipeline::{self, CancellationToken, GenerateRequest};
use crate::report::diff;
use crate::report::REPORT_JSON;

/// Output directory used when neither `--out` nor `BROKERGEN_OUT` is given.
pub const DEFAULT_OUT_DIR: &str = "brokergen-out";

/// Output directory from `BROKERGEN_OUT`, or [`DEFAULT_OUT_DIR`].
#[must_use]
pub fn default_out_dir() -> PathBuf {
    std::env::var("BROKERGEN_OUT").map_or_else(|_| PathBuf::from(DEFAULT_OUT_DIR), PathBuf::from)
}

/// Execute the `generate` command.
///
/// Prints the fatal/warning summary. With `show_diff`, also prints how the
/// artifact set changed since the report already in `out_dir`.
///
/// # Errors
///
/// Returns an error string, including the summary line, if the run fails.
pub fn run_with_context(
    ctx: &ServiceContext,
    inventory: &Path,
    hints: &Path,
    out_dir: &Path,
    jobs: usize,
    show_diff: bool,
) -> Result<(), String> {
    let previous = if show_diff {
        pipeline::previous_report(ctx, out_dir).map_err(|e| format!("cannot diff: {e}"))?
    } else {
        None
    };

    let request = GenerateRequest {
        inventory: inventory.to_path_buf(),
        hints: hints.to_path_buf(),
        out_dir: out_dir.to_path_buf(),
        jobs,
    };
    let generation = pipeline::run(ctx, &request, &CancellationToken::new())
        .map_err(|e| format!("generation failed: {e}\nFatal errors: 1, warnings recorded: 0"))?;

    let summary = &generation.report.summary;
    println!(
        "Generated {} artifact(s) for {} component(s) into {}",
        summary.artifacts_total,
        summary.components_total,
        out_dir.display()
    );
    println!("Fatal errors: 0, warnings recorded: {}", summary.warnings);
    println!("Report written to {}", out_dir.join(REPORT_JSON).display());

    if show_diff {
        match previous {
            Some(old) => {
                let changes = diff::diff_reports(&old, &generation.report);
                println!("{}", diff::format_diff(&changes));
            }
            None => println!("No previous report found; nothing to diff."),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    fn context() -> ServiceContext {
        ServiceContext::in_memory(MemoryFileSystem::with_files([
            (
                "/in/inv.yaml",
                "components:\n  - name: Orders\n    kind: map\n    targetSchemaRef: OrderOut\n"
                    .to_string(),
            ),
            ("/in/hints.yaml", "project: Orders\n".to_string()),
        ]))
    }

    #[test]
    fn generate_then_diff_succeeds() {
        let ctx = context();
        let inv = Path::new("/in/inv.yaml");
        let hints = Path::new("/in/hints.yaml");
        let out = Path::new("/out");
        assert!(run_with_context(&ctx, inv, hints, out, 1, true).is_ok());
        assert!(run_with_context(&ctx, inv, hints, out, 1, true).is_ok());
        let transform = Path::new("/out/transforms/xsl/Orders_Transform.xsl");
        assert!(ctx.fs.exists(transform));
    }

    #[test]
    fn fatal_error_reports_summary() {
        let ctx = ServiceContext::in_memory(MemoryFileSystem::with_files([
            ("/in/inv.yaml", "components:\n  - name: X\n    kind: gizmo\n".to_string()),
            ("/in/hints.yaml", "project: X\n".to_string()),
        ]));
        let err = run_with_context(
            &ctx,
            Path::new("/in/inv.yaml"),
            Path::new("/in/hints.yaml"),
            Path::new("/out"),
            1,
            false,
        )
        .unwrap_err();
        assert!(err.contains("unrecognized kind 'gizmo'"));
        assert!(err.contains("Fatal errors: 1"));
    }

    #[test]
    fn default_out_dir_falls_back() {
        if std::env::var("BROKERGEN_OUT").is_err() {
            assert_eq!(default_out_dir(), PathBuf::from(DEFAULT_OUT_DIR));
        }
    }
}
