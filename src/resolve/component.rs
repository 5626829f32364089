//! Per-component resolution stage.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{resolve, FieldMapping, MappingRule, UnresolvedReason};
use crate::classify::ComplexityTier;
use crate::error::{Warning, WarningKind};
use crate::inventory::{
    Component, ComponentDetail, ComponentKind, Hints, Inventory, LookupKind, SchemaField,
};

/// Envelope of the target document a style transform produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEnvelope {
    /// Target schema name.
    pub schema: String,
    /// Target namespace, if the schema declares one.
    pub namespace: Option<String>,
    /// Root element name.
    pub root: String,
}

/// Everything the synthesizer needs to know about one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResolution {
    /// Component name.
    pub component: String,
    /// Field mappings in target declaration order.
    pub mappings: Vec<FieldMapping>,
    /// Set when a style transform can be generated.
    pub target: Option<TargetEnvelope>,
    /// Maps and schemas an orchestration references, in reference order.
    pub data_references: Vec<String>,
    /// Component-level warnings.
    pub warnings: Vec<Warning>,
}

impl ComponentResolution {
    fn empty(component: &Component) -> Self {
        Self {
            component: component.name().to_string(),
            mappings: Vec::new(),
            target: None,
            data_references: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Distinct enrichment lookups in order of first use.
    #[must_use]
    pub fn enrichment_refs(&self) -> Vec<LookupKind> {
        let mut refs = Vec::new();
        for lookup in self
            .mappings
            .iter()
            .filter_map(FieldMapping::enrichment_ref)
        {
            if !refs.contains(&lookup) {
                refs.push(lookup);
            }
        }
        refs
    }

    /// Mappings that need manual review.
    pub fn unresolved(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter().filter(|m| m.is_unresolved())
    }

    /// Warnings plus one per unresolved mapping.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len() + self.unresolved().count()
    }
}

/// Resolves one component against the inventory and hints.
///
/// Components classified `Unknown` get a manual-review warning so they are
/// never treated as simple further down. For such a map every target field
/// is left unresolved with [`UnresolvedReason::UnclassifiedSource`].
#[must_use]
pub fn resolve_component(
    component: &Component,
    tier: ComplexityTier,
    inventory: &Inventory,
    hints: &Hints,
) -> ComponentResolution {
    let mut resolution = ComponentResolution::empty(component);

    if tier == ComplexityTier::Unknown {
        let cause = component
            .extraction_error()
            .unwrap_or("no structural signals");
        resolution.warnings.push(Warning::new(
            component.name(),
            WarningKind::ManualReview,
            format!("structure could not be extracted ({cause}); classified unknown"),
        ));
    }

    match component.detail() {
        ComponentDetail::Map { source_schema, target_schema, .. } => {
            resolve_map(
                component,
                source_schema.as_deref(),
                target_schema.as_deref(),
                inventory,
                hints,
                &mut resolution,
            );
        }
        ComponentDetail::Orchestration { references, .. } => {
            for reference in references {
                match inventory.get(reference).map(Component::kind) {
                    Some(ComponentKind::Map | ComponentKind::Schema) => {
                        if !resolution.data_references.contains(reference) {
                            resolution.data_references.push(reference.clone());
                        }
                    }
                    Some(_) => {}
                    None => debug!(
                        component = component.name(),
                        reference = reference.as_str(),
                        "orchestration references a component outside the inventory"
                    ),
                }
            }
        }
        ComponentDetail::Schema { .. }
        | ComponentDetail::CustomComponent { .. }
        | ComponentDetail::Pipeline { .. } => {}
    }

    if tier == ComplexityTier::Unknown {
        for mapping in &mut resolution.mappings {
            mapping.source_path = None;
            mapping.rule = MappingRule::Unresolved {
                reason: UnresolvedReason::UnclassifiedSource,
            };
        }
    }

    resolution
}

fn resolve_map(
    component: &Component,
    source_schema: Option<&str>,
    target_schema: Option<&str>,
    inventory: &Inventory,
    hints: &Hints,
    resolution: &mut ComponentResolution,
) {
    let name = component.name();
    let Some(target_name) = target_schema else {
        let message = if source_schema.is_some() {
            "map has no target schema reference; style transform suppressed"
        } else {
            "map has neither source nor target schema reference; style transform suppressed"
        };
        resolution.warnings.push(Warning::new(
            name,
            WarningKind::MissingSchemaReference,
            message,
        ));
        return;
    };

    if source_schema.is_none() {
        resolution.warnings.push(Warning::new(
            name,
            WarningKind::MissingSchemaReference,
            "map has no source schema reference; target fields resolved without a source",
        ));
    }

    let source = source_schema.map_or(&[][..], |s| schema_fields(inventory, name, s));
    let target = schema_fields(inventory, name, target_name);

    resolution.mappings = resolve(source, target, &hints.scoped(name));
    resolution.target = Some(envelope(inventory, target_name));
}

fn schema_fields<'a>(
    inventory: &'a Inventory,
    component: &str,
    schema: &str,
) -> &'a [SchemaField] {
    inventory.schema_fields(schema).unwrap_or_else(|| {
        warn!(
            component,
            schema,
            "schema not in inventory; treating it as having no fields"
        );
        &[]
    })
}

fn envelope(inventory: &Inventory, schema: &str) -> TargetEnvelope {
    let (namespace, root) = match inventory.get(schema).map(Component::detail) {
        Some(ComponentDetail::Schema { namespace, root, .. }) => (namespace.clone(), root.clone()),
        _ => (None, None),
    };
    TargetEnvelope {
        schema: schema.to_string(),
        namespace,
        root: root.unwrap_or_else(|| schema.to_string()),
    }
}
