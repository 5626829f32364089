//! Component inventory: the legacy integration units handed over by the
//! artifact parser.
//!
//! Each component kind carries its own attribute set ([`ComponentDetail`]),
//! so there is no field that is "only meaningful for maps" on a schema.

pub mod hints;
pub mod loader;
pub mod record;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

pub use hints::{EnrichmentHint, Hints, LookupKind, ScopedHints};

/// The kind of a legacy component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Business process / control flow.
    Orchestration,
    /// Schema-to-schema message map.
    Map,
    /// Message schema definition.
    Schema,
    /// Custom executable code.
    CustomComponent,
    /// Receive/send pipeline.
    Pipeline,
}

impl ComponentKind {
    /// Every kind, in report order.
    pub const ALL: [Self; 5] = [
        Self::Orchestration,
        Self::Map,
        Self::Schema,
        Self::CustomComponent,
        Self::Pipeline,
    ];

    /// Stable snake-case label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orchestration => "orchestration",
            Self::Map => "map",
            Self::Schema => "schema",
            Self::CustomComponent => "custom_component",
            Self::Pipeline => "pipeline",
        }
    }

    /// Parses a kind label, ignoring case, `_`, `-` and spaces.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "orchestration" => Some(Self::Orchestration),
            "map" => Some(Self::Map),
            "schema" => Some(Self::Schema),
            "customcomponent" => Some(Self::CustomComponent),
            "pipeline" => Some(Self::Pipeline),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaField {
    /// Slash-separated element path, e.g. `Invoice/Header/InvoiceNo`.
    pub path: String,
    /// Whether the target runtime requires the field.
    #[serde(default)]
    pub required: bool,
    /// Declared default value, if any.
    #[serde(default)]
    pub default: Option<String>,
}

impl SchemaField {
    /// Creates an optional field without a default.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required: false,
            default: None,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares a default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        leaf_name(&self.path)
    }
}

/// Last segment of a `/`- or `.`-separated path.
#[must_use]
pub fn leaf_name(path: &str) -> &str {
    path.rsplit(['/', '.']).next().unwrap_or(path)
}

/// Kind-specific attributes of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentDetail {
    /// Control flow that may reference maps and schemas.
    Orchestration {
        /// Names of components this orchestration uses.
        references: Vec<String>,
        /// Decide/loop shapes found by the parser.
        branch_count: u32,
        /// The flow talks to a database.
        requires_database: bool,
    },
    /// A message map between two schemas.
    Map {
        /// Source schema name.
        source_schema: Option<String>,
        /// Target schema name.
        target_schema: Option<String>,
        /// Number of functoids in the map.
        functoid_count: u32,
        /// Further schemas consulted by the map (lookups, merges).
        auxiliary_schemas: Vec<String>,
    },
    /// A schema with its field list.
    Schema {
        /// Target namespace, if any.
        namespace: Option<String>,
        /// Root element name; defaults to the schema name.
        root: Option<String>,
        /// Declared fields in document order.
        fields: Vec<SchemaField>,
    },
    /// Custom code shipped with the legacy project.
    CustomComponent {
        /// The parser found business logic in it.
        business_logic: bool,
    },
    /// A receive or send pipeline.
    Pipeline {
        /// Number of configured stages.
        stage_count: u32,
    },
}

impl ComponentDetail {
    /// The kind this detail belongs to.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Orchestration { .. } => ComponentKind::Orchestration,
            Self::Map { .. } => ComponentKind::Map,
            Self::Schema { .. } => ComponentKind::Schema,
            Self::CustomComponent { .. } => ComponentKind::CustomComponent,
            Self::Pipeline { .. } => ComponentKind::Pipeline,
        }
    }
}

/// One legacy integration unit. The kind is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: String,
    detail: ComponentDetail,
    discovered_files: Vec<String>,
    extraction_error: Option<String>,
}

impl Component {
    /// Creates a component from its name and kind-specific detail.
    pub fn new(name: impl Into<String>, detail: ComponentDetail) -> Self {
        Self {
            name: name.into(),
            detail,
            discovered_files: Vec::new(),
            extraction_error: None,
        }
    }

    /// Shorthand for a map with the given schema pair and no functoids.
    pub fn map(
        name: impl Into<String>,
        source_schema: Option<&str>,
        target_schema: Option<&str>,
    ) -> Self {
        Self::new(
            name,
            ComponentDetail::Map {
                source_schema: source_schema.map(String::from),
                target_schema: target_schema.map(String::from),
                functoid_count: 0,
                auxiliary_schemas: Vec::new(),
            },
        )
    }

    /// Shorthand for a schema with the given fields.
    pub fn schema(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self::new(
            name,
            ComponentDetail::Schema {
                namespace: None,
                root: None,
                fields,
            },
        )
    }

    /// Sets the files the parser discovered for this component.
    #[must_use]
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.discovered_files = files;
        self
    }

    /// Records that the parser could not extract this component's structure.
    #[must_use]
    pub fn with_extraction_error(mut self, message: impl Into<String>) -> Self {
        self.extraction_error = Some(message.into());
        self
    }

    /// Sets the functoid count; ignored for non-map components.
    #[must_use]
    pub fn with_functoids(mut self, count: u32) -> Self {
        if let ComponentDetail::Map { functoid_count, .. } = &mut self.detail {
            *functoid_count = count;
        }
        self
    }

    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component kind.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.detail.kind()
    }

    /// Kind-specific attributes.
    #[must_use]
    pub fn detail(&self) -> &ComponentDetail {
        &self.detail
    }

    /// Files the parser discovered, in discovery order.
    #[must_use]
    pub fn discovered_files(&self) -> &[String] {
        &self.discovered_files
    }

    /// Parser failure message, when structure could not be extracted.
    #[must_use]
    pub fn extraction_error(&self) -> Option<&str> {
        self.extraction_error.as_deref()
    }

    /// Source schema reference (maps only).
    #[must_use]
    pub fn source_schema_ref(&self) -> Option<&str> {
        match &self.detail {
            ComponentDetail::Map { source_schema, .. } => source_schema.as_deref(),
            _ => None,
        }
    }

    /// Target schema reference (maps only).
    #[must_use]
    pub fn target_schema_ref(&self) -> Option<&str> {
        match &self.detail {
            ComponentDetail::Map { target_schema, .. } => target_schema.as_deref(),
            _ => None,
        }
    }

    /// Functoid count; zero for everything but maps.
    #[must_use]
    pub fn functoid_count(&self) -> u32 {
        match &self.detail {
            ComponentDetail::Map { functoid_count, .. } => *functoid_count,
            _ => 0,
        }
    }
}

/// Owns every component of a run, in document order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    components: Vec<Component>,
    index: HashMap<String, usize>,
}

impl Inventory {
    /// Builds an inventory, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateComponent`] when two components share a name.
    pub fn new(components: Vec<Component>) -> PipelineResult<Self> {
        let mut index = HashMap::with_capacity(components.len());
        for (i, component) in components.iter().enumerate() {
            if index.insert(component.name.clone(), i).is_some() {
                return Err(PipelineError::DuplicateComponent(component.name.clone()));
            }
        }
        Ok(Self { components, index })
    }

    /// Components in document order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Looks a component up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` when the inventory holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Fields of the named schema, or `None` if no schema has that name.
    #[must_use]
    pub fn schema_fields(&self, name: &str) -> Option<&[SchemaField]> {
        match self.get(name).map(Component::detail) {
            Some(ComponentDetail::Schema { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    /// Component counts for every kind, zero-filled.
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<ComponentKind, usize> {
        let mut counts: BTreeMap<ComponentKind, usize> =
            ComponentKind::ALL.iter().map(|k| (*k, 0)).collect();
        for component in &self.components {
            *counts.entry(component.kind()).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_accepts_legacy_spellings() {
        assert_eq!(ComponentKind::parse("Map"), Some(ComponentKind::Map));
        assert_eq!(
            ComponentKind::parse("CustomComponent"),
            Some(ComponentKind::CustomComponent)
        );
        assert_eq!(
            ComponentKind::parse("custom_component"),
            Some(ComponentKind::CustomComponent)
        );
        assert_eq!(
            ComponentKind::parse("ORCHESTRATION"),
            Some(ComponentKind::Orchestration)
        );
        assert_eq!(ComponentKind::parse("adapter"), None);
        assert_eq!(ComponentKind::parse(""), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Inventory::new(vec![
            Component::schema("Invoice", vec![]),
            Component::map("Invoice", Some("A"), Some("B")),
        ])
        .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateComponent(ref name) if name == "Invoice"));
    }

    #[test]
    fn schema_fields_only_for_schemas() {
        let inventory = Inventory::new(vec![
            Component::schema("Invoice", vec![SchemaField::new("Invoice/No")]),
            Component::map("Invoice_To_Doc", Some("Invoice"), Some("Doc")),
        ])
        .unwrap();
        assert_eq!(inventory.schema_fields("Invoice").map(<[_]>::len), Some(1));
        assert!(inventory.schema_fields("Invoice_To_Doc").is_none());
        assert!(inventory.schema_fields("Doc").is_none());
    }

    #[test]
    fn count_by_kind_is_zero_filled() {
        let inventory = Inventory::new(vec![Component::map("M", None, None)]).unwrap();
        let counts = inventory.count_by_kind();
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[&ComponentKind::Map], 1);
        assert_eq!(counts[&ComponentKind::Schema], 0);
    }

    #[test]
    fn functoids_only_apply_to_maps() {
        let map = Component::map("M", Some("A"), Some("B")).with_functoids(5);
        let schema = Component::schema("S", vec![]).with_functoids(5);
        assert_eq!(map.functoid_count(), 5);
        assert_eq!(schema.functoid_count(), 0);
    }

    #[test]
    fn leaf_name_handles_both_separators() {
        assert_eq!(leaf_name("Invoice/Header/InvoiceNo"), "InvoiceNo");
        assert_eq!(leaf_name("Invoice.Header.Currency"), "Currency");
        assert_eq!(leaf_name("Flat"), "Flat");
    }
}
