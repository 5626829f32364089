//! `brokergen inspect` command.

use std::path::Path;

use crate::classify::classify;
use crate::context::ServiceContext;
use crate::inventory::loader::load_inventory;

/// Execute the `inspect` command.
///
/// Loads and classifies the inventory, then prints one row per component
/// with its kind, tier and signal counts. Nothing is written.
///
/// # Errors
///
/// Returns an error string if the inventory cannot be loaded.
pub fn run_with_context(ctx: &ServiceContext, inventory: &Path) -> Result<(), String> {
    let inventory = load_inventory(ctx, inventory)
        .map_err(|e| format!("failed to load inventory: {e}"))?;
    if inventory.is_empty() {
        println!("No components in inventory.");
        return Ok(());
    }

    let rows: Vec<(String, String, String, String)> = inventory
        .components()
        .iter()
        .map(|component| {
            let classification = classify(component);
            let signals = classification.signals.map_or_else(
                || component.extraction_error().unwrap_or("-").to_string(),
                |s| s.to_string(),
            );
            (
                component.name().to_string(),
                component.kind().to_string(),
                classification.tier.to_string(),
                signals,
            )
        })
        .collect();

    let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(4).max(4);
    let kind_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(4).max(4);
    let tier_width = rows.iter().map(|r| r.2.len()).max().unwrap_or(4).max(4);

    println!(
        "{:<name_width$}  {:<kind_width$}  {:<tier_width$}  SIGNALS",
        "NAME", "KIND", "TIER"
    );
    println!(
        "{:-<name_width$}  {:-<kind_width$}  {:-<tier_width$}  -------",
        "", "", ""
    );
    for (name, kind, tier, signals) in &rows {
        println!("{name:<name_width$}  {kind:<kind_width$}  {tier:<tier_width$}  {signals}");
    }

    println!("\n{} component(s) total.", rows.len());
    Ok(())
}
