//! Mapping resolution: which source field (or rule) fills each target field.
//!
//! Resolution walks the target schema in declaration order and applies, per
//! field, the first rule that matches: exact path/name, alias, required
//! default, declared enrichment. Anything else is `Unresolved`. A field with
//! more than one candidate is never guessed at.

pub mod component;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WarningKind;
use crate::inventory::{leaf_name, LookupKind, SchemaField, ScopedHints};

pub use component::{resolve_component, ComponentResolution, TargetEnvelope};

/// Why a target field could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No source field, alias, default or enrichment applies.
    NoCandidate,
    /// Several candidates matched equally well.
    Ambiguous {
        /// The competing candidates.
        candidates: Vec<String>,
    },
    /// An enrichment hint names a lookup outside the known set.
    UnknownLookup {
        /// Lookup label as written in the hints.
        lookup: String,
    },
    /// The map itself classified `unknown`, so no correspondence is trusted.
    UnclassifiedSource,
}

impl UnresolvedReason {
    /// Warning category this reason is reported under.
    #[must_use]
    pub fn warning_kind(&self) -> WarningKind {
        match self {
            Self::NoCandidate | Self::UnclassifiedSource => WarningKind::ManualReview,
            Self::Ambiguous { .. } => WarningKind::AmbiguousMapping,
            Self::UnknownLookup { .. } => WarningKind::EnrichmentRefUnresolvable,
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidate => f.write_str("no source field, alias, default or enrichment"),
            Self::Ambiguous { candidates } => {
                write!(f, "ambiguous between {}", candidates.join(", "))
            }
            Self::UnknownLookup { lookup } => write!(f, "unknown enrichment lookup '{lookup}'"),
            Self::UnclassifiedSource => f.write_str("map structure could not be extracted"),
        }
    }
}

/// How a target field is filled. Each mapping has exactly one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MappingRule {
    /// Same path or name in the source.
    Identity,
    /// Source field found through an alias.
    Renamed,
    /// Required field absent from the source, filled with a declared default.
    Defaulted {
        /// The default value.
        value: String,
    },
    /// Filled by an external lookup at runtime.
    Enriched {
        /// The lookup that provides the value.
        lookup: LookupKind,
    },
    /// Needs manual review.
    Unresolved {
        /// Why resolution failed.
        reason: UnresolvedReason,
    },
}

impl MappingRule {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Renamed => "renamed",
            Self::Defaulted { .. } => "defaulted",
            Self::Enriched { .. } => "enriched",
            Self::Unresolved { .. } => "unresolved",
        }
    }
}

/// One resolved correspondence within a transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Source field path; `None` when the value does not come from the source.
    pub source_path: Option<String>,
    /// Target field path.
    pub target_path: String,
    /// Whether the target runtime requires the field.
    pub required: bool,
    /// Resolution rule.
    #[serde(flatten)]
    pub rule: MappingRule,
}

impl FieldMapping {
    fn new(target: &SchemaField, source_path: Option<&str>, rule: MappingRule) -> Self {
        Self {
            source_path: source_path.map(String::from),
            target_path: target.path.clone(),
            required: target.required,
            rule,
        }
    }

    /// Lookup backing this mapping, set exactly when the rule is `Enriched`.
    #[must_use]
    pub fn enrichment_ref(&self) -> Option<LookupKind> {
        match self.rule {
            MappingRule::Enriched { lookup } => Some(lookup),
            _ => None,
        }
    }

    /// Returns `true` for mappings that need manual review.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.rule, MappingRule::Unresolved { .. })
    }

    /// Leaf name of the target field.
    #[must_use]
    pub fn target_name(&self) -> &str {
        leaf_name(&self.target_path)
    }
}

/// Outcome of looking for source candidates.
enum Candidates<'a> {
    None,
    One(&'a SchemaField),
    Many(Vec<String>),
}

fn candidates<'a>(
    source: &'a [SchemaField],
    pred: impl Fn(&SchemaField) -> bool,
) -> Candidates<'a> {
    let matched: Vec<&SchemaField> = source.iter().filter(|s| pred(s)).collect();
    match matched.as_slice() {
        [] => Candidates::None,
        [one] => Candidates::One(one),
        many => Candidates::Many(many.iter().map(|s| s.path.clone()).collect()),
    }
}

/// Resolves every target field against the source schema.
///
/// The output has one mapping per target field, in target declaration
/// order, and depends only on the arguments.
#[must_use]
pub fn resolve(
    source: &[SchemaField],
    target: &[SchemaField],
    hints: &ScopedHints<'_>,
) -> Vec<FieldMapping> {
    target
        .iter()
        .map(|field| resolve_field(source, field, hints))
        .collect()
}

fn resolve_field(
    source: &[SchemaField],
    field: &SchemaField,
    hints: &ScopedHints<'_>,
) -> FieldMapping {
    let ambiguous = |candidates| {
        FieldMapping::new(
            field,
            None,
            MappingRule::Unresolved {
                reason: UnresolvedReason::Ambiguous { candidates },
            },
        )
    };

    // 1. exact path, then exact name
    match candidates(source, |s| s.path == field.path) {
        Candidates::One(s) => {
            return FieldMapping::new(field, Some(s.path.as_str()), MappingRule::Identity);
        }
        Candidates::Many(c) => return ambiguous(c),
        Candidates::None => {}
    }
    match candidates(source, |s| s.name() == field.name()) {
        Candidates::One(s) => {
            return FieldMapping::new(field, Some(s.path.as_str()), MappingRule::Identity);
        }
        Candidates::Many(c) => return ambiguous(c),
        Candidates::None => {}
    }

    // 2. alias table
    if let Some(alias) = hints.alias_for(field) {
        let by_path = candidates(source, |s| s.path == alias);
        let found = match by_path {
            Candidates::None => candidates(source, |s| s.name() == leaf_name(alias)),
            other => other,
        };
        match found {
            Candidates::One(s) => {
                return FieldMapping::new(field, Some(s.path.as_str()), MappingRule::Renamed);
            }
            Candidates::Many(c) => return ambiguous(c),
            Candidates::None => {}
        }
    }

    // 3. required and defaulted
    if field.required {
        if let Some(value) = hints.default_for(field) {
            return FieldMapping::new(
                field,
                None,
                MappingRule::Defaulted {
                    value: value.to_string(),
                },
            );
        }
    }

    // 4. declared enrichment
    let declared = hints.enrichments_for(field);
    if !declared.is_empty() {
        if let Some(unknown) = declared
            .iter()
            .find(|h| LookupKind::parse(&h.lookup).is_none())
        {
            return FieldMapping::new(
                field,
                None,
                MappingRule::Unresolved {
                    reason: UnresolvedReason::UnknownLookup {
                        lookup: unknown.lookup.clone(),
                    },
                },
            );
        }
        let lookups: BTreeSet<LookupKind> = declared
            .iter()
            .filter_map(|h| LookupKind::parse(&h.lookup))
            .collect();
        let lookups: Vec<LookupKind> = lookups.into_iter().collect();
        return match lookups.as_slice() {
            [lookup] => FieldMapping::new(field, None, MappingRule::Enriched { lookup: *lookup }),
            many => ambiguous(many.iter().map(|l| l.as_str().to_string()).collect()),
        };
    }

    // 5. nothing applies
    FieldMapping::new(
        field,
        None,
        MappingRule::Unresolved {
            reason: UnresolvedReason::NoCandidate,
        },
    )
}
