//! Complexity classification.
//!
//! A component's tier is a pure function of its structural signals:
//! functoid/branch/stage counts, distinct external schema references, and
//! whether it carries custom executable logic.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inventory::{Component, ComponentDetail};

/// Signal count from which a component is `Complex`.
pub const COMPLEX_THRESHOLD: u32 = 4;

/// Discrete complexity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    /// No structural signals.
    Simple,
    /// One to three signals.
    Moderate,
    /// Four or more signals, or custom logic.
    Complex,
    /// The parser could not extract any signal.
    Unknown,
}

impl ComplexityTier {
    /// Every tier, in report order.
    pub const ALL: [Self; 4] = [Self::Simple, Self::Moderate, Self::Complex, Self::Unknown];

    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural signals extracted from one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signals {
    /// Functoids (maps), branches (orchestrations) or stages (pipelines).
    pub structural: u32,
    /// Distinct schemas referenced beyond a map's own source/target pair.
    pub external_refs: u32,
    /// Custom executable logic is present.
    pub custom_logic: bool,
}

impl Signals {
    /// Total counted signals.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.structural.saturating_add(self.external_refs)
    }
}

impl fmt::Display for Signals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "structural={} refs={}",
            self.structural, self.external_refs
        )?;
        if self.custom_logic {
            f.write_str(" custom")?;
        }
        Ok(())
    }
}

/// Tier assigned to one component, with the signals that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Component name.
    pub component: String,
    /// Assigned tier.
    pub tier: ComplexityTier,
    /// Extracted signals; `None` when the tier is `Unknown`.
    pub signals: Option<Signals>,
}

/// Extracts signals, or `None` if the parser could not read the component.
#[must_use]
pub fn extract_signals(component: &Component) -> Option<Signals> {
    if component.extraction_error().is_some() {
        return None;
    }
    let signals = match component.detail() {
        ComponentDetail::Map {
            source_schema,
            target_schema,
            functoid_count,
            auxiliary_schemas,
        } => {
            let external: BTreeSet<&str> = auxiliary_schemas
                .iter()
                .map(String::as_str)
                .filter(|s| Some(*s) != source_schema.as_deref())
                .filter(|s| Some(*s) != target_schema.as_deref())
                .collect();
            Signals {
                structural: *functoid_count,
                external_refs: count(external.len()),
                custom_logic: false,
            }
        }
        ComponentDetail::Orchestration { references, branch_count, .. } => {
            let distinct: BTreeSet<&String> = references.iter().collect();
            Signals {
                structural: *branch_count,
                external_refs: count(distinct.len()),
                custom_logic: false,
            }
        }
        ComponentDetail::Pipeline { stage_count } => Signals {
            structural: *stage_count,
            ..Signals::default()
        },
        ComponentDetail::CustomComponent { business_logic } => Signals {
            custom_logic: *business_logic,
            ..Signals::default()
        },
        ComponentDetail::Schema { .. } => Signals::default(),
    };
    Some(signals)
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Maps signals onto a tier. Monotonic in `signals.count()`.
#[must_use]
pub fn tier_for(signals: &Signals) -> ComplexityTier {
    if signals.custom_logic {
        return ComplexityTier::Complex;
    }
    match signals.count() {
        0 => ComplexityTier::Simple,
        n if n < COMPLEX_THRESHOLD => ComplexityTier::Moderate,
        _ => ComplexityTier::Complex,
    }
}

/// Classifies a component.
///
/// Kind validity is enforced when records become [`Component`]s, so every
/// value reaching this function has a classifiable kind.
#[must_use]
pub fn classify(component: &Component) -> Classification {
    let signals = extract_signals(component);
    let tier = signals.as_ref().map_or(ComplexityTier::Unknown, tier_for);
    Classification {
        component: component.name().to_string(),
        tier,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Component, ComponentDetail};

    fn orchestration(refs: &[&str], branches: u32) -> Component {
        Component::new(
            "Flow",
            ComponentDetail::Orchestration {
                references: refs.iter().map(|s| (*s).to_string()).collect(),
                branch_count: branches,
                requires_database: false,
            },
        )
    }

    #[test]
    fn zero_signals_is_simple() {
        let map = Component::map("CDM_FreightInvoice_To_DocPackRequest", Some("A"), Some("B"));
        let c = classify(&map);
        assert_eq!(c.tier, ComplexityTier::Simple);
        assert_eq!(c.signals, Some(Signals::default()));
    }

    #[test]
    fn thresholds() {
        let tiers: Vec<ComplexityTier> = (0..=6)
            .map(|n| classify(&Component::map("M", Some("A"), Some("B")).with_functoids(n)).tier)
            .collect();
        assert_eq!(
            tiers,
            vec![
                ComplexityTier::Simple,
                ComplexityTier::Moderate,
                ComplexityTier::Moderate,
                ComplexityTier::Moderate,
                ComplexityTier::Complex,
                ComplexityTier::Complex,
                ComplexityTier::Complex,
            ]
        );
    }

    #[test]
    fn tier_never_decreases_as_signals_grow() {
        fn rank(t: ComplexityTier) -> u8 {
            match t {
                ComplexityTier::Simple => 0,
                ComplexityTier::Moderate => 1,
                ComplexityTier::Complex => 2,
                ComplexityTier::Unknown => u8::MAX,
            }
        }
        let mut previous = 0;
        for structural in 0..20 {
            for external_refs in 0..3 {
                let signals = Signals {
                    structural,
                    external_refs,
                    custom_logic: false,
                };
                let r = rank(tier_for(&signals));
                if external_refs == 0 {
                    assert!(r >= previous);
                    previous = r;
                }
                let without_refs = Signals {
                    external_refs: 0,
                    ..signals
                };
                assert!(r >= rank(tier_for(&without_refs)));
            }
        }
    }

    #[test]
    fn custom_logic_is_always_complex() {
        let custom = Component::new(
            "Helpers",
            ComponentDetail::CustomComponent {
                business_logic: true,
            },
        );
        assert_eq!(classify(&custom).tier, ComplexityTier::Complex);

        let plain = Component::new(
            "Helpers",
            ComponentDetail::CustomComponent {
                business_logic: false,
            },
        );
        assert_eq!(classify(&plain).tier, ComplexityTier::Simple);
    }

    #[test]
    fn extraction_error_is_unknown_not_simple() {
        let map = Component::map("M", Some("A"), Some("B")).with_extraction_error("unreadable");
        let c = classify(&map);
        assert_eq!(c.tier, ComplexityTier::Unknown);
        assert!(c.signals.is_none());
    }

    #[test]
    fn auxiliary_schemas_exclude_own_pair_and_duplicates() {
        let map = Component::new(
            "M",
            ComponentDetail::Map {
                source_schema: Some("A".into()),
                target_schema: Some("B".into()),
                functoid_count: 0,
                auxiliary_schemas: vec!["A".into(), "C".into(), "C".into(), "D".into()],
            },
        );
        let signals = extract_signals(&map).unwrap();
        assert_eq!(signals.external_refs, 2);
        assert_eq!(classify(&map).tier, ComplexityTier::Moderate);
    }

    #[test]
    fn orchestration_counts_branches_and_distinct_references() {
        let tier = |refs: &[&str], branches| classify(&orchestration(refs, branches)).tier;
        assert_eq!(tier(&[], 0), ComplexityTier::Simple);
        assert_eq!(tier(&["M", "M"], 0), ComplexityTier::Moderate);
        assert_eq!(tier(&["M", "S"], 2), ComplexityTier::Complex);
    }

    #[test]
    fn schemas_are_simple() {
        let schema = Component::schema("Invoice", vec![]);
        assert_eq!(classify(&schema).tier, ComplexityTier::Simple);
    }
}
