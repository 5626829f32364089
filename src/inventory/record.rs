//! Loose key/value records as produced by the legacy-artifact parser, and
//! their conversion into typed [`Component`]s.

use serde::{Deserialize, Serialize};

use super::{Component, ComponentDetail, ComponentKind, Inventory, SchemaField};
use crate::error::{PipelineError, PipelineResult};

/// Top-level inventory document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InventoryDocument {
    /// Component records in discovery order.
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// One component as written by the parser. Only `name` and `kind` are
/// required; attributes that do not apply to the kind are ignored.
///
/// Keys are camelCase, and the parser's older snake_case spellings are
/// accepted as aliases. Any other key is a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentRecord {
    /// Component name.
    pub name: String,
    /// Kind label, e.g. `Map`.
    pub kind: String,
    /// Source schema name (maps).
    #[serde(default, alias = "source_schema_ref")]
    pub source_schema_ref: Option<String>,
    /// Target schema name (maps).
    #[serde(default, alias = "target_schema_ref")]
    pub target_schema_ref: Option<String>,
    /// Functoid count (maps); zero when unknown.
    #[serde(default, alias = "functoid_count")]
    pub functoid_count: Option<u32>,
    /// Extra schemas consulted by a map.
    #[serde(default, alias = "auxiliary_schemas")]
    pub auxiliary_schemas: Vec<String>,
    /// Files the parser associated with the component.
    #[serde(default, alias = "discovered_files")]
    pub discovered_files: Vec<String>,
    /// Set when the parser failed to read the component's structure.
    #[serde(default, alias = "extraction_error")]
    pub extraction_error: Option<String>,
    /// Components an orchestration uses.
    #[serde(default)]
    pub references: Vec<String>,
    /// Decide/loop shapes in an orchestration.
    #[serde(default, alias = "branch_count")]
    pub branch_count: Option<u32>,
    /// The orchestration talks to a database.
    #[serde(default, alias = "requires_database")]
    pub requires_database: bool,
    /// Schema target namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Schema root element.
    #[serde(default)]
    pub root: Option<String>,
    /// Schema fields.
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    /// Custom code contains business logic.
    #[serde(default, alias = "business_logic")]
    pub business_logic: bool,
    /// Pipeline stage count.
    #[serde(default, alias = "stage_count")]
    pub stage_count: Option<u32>,
}

impl TryFrom<ComponentRecord> for Component {
    type Error = PipelineError;

    fn try_from(record: ComponentRecord) -> PipelineResult<Self> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(PipelineError::InvalidRecord(format!(
                "component of kind '{}' has an empty name",
                record.kind
            )));
        }
        check_name(&name)?;
        let kind = ComponentKind::parse(&record.kind).ok_or_else(|| {
            PipelineError::InvalidComponentKind {
                component: name.clone(),
                kind: record.kind.clone(),
            }
        })?;

        let detail = match kind {
            ComponentKind::Orchestration => ComponentDetail::Orchestration {
                references: record.references,
                branch_count: record.branch_count.unwrap_or(0),
                requires_database: record.requires_database,
            },
            ComponentKind::Map => ComponentDetail::Map {
                source_schema: non_empty(record.source_schema_ref),
                target_schema: non_empty(record.target_schema_ref),
                functoid_count: record.functoid_count.unwrap_or(0),
                auxiliary_schemas: record.auxiliary_schemas,
            },
            ComponentKind::Schema => ComponentDetail::Schema {
                namespace: non_empty(record.namespace),
                root: non_empty(record.root),
                fields: record.fields,
            },
            ComponentKind::CustomComponent => ComponentDetail::CustomComponent {
                business_logic: record.business_logic,
            },
            ComponentKind::Pipeline => ComponentDetail::Pipeline {
                stage_count: record.stage_count.unwrap_or(0),
            },
        };

        let mut component = Component::new(name, detail).with_files(record.discovered_files);
        if let Some(message) = record.extraction_error {
            component = component.with_extraction_error(message);
        }
        Ok(component)
    }
}

/// Artifact file names are derived from component names, so a name must be
/// usable as a single path segment.
fn check_name(name: &str) -> PipelineResult<()> {
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(PipelineError::InvalidRecord(format!(
            "component name '{name}' is not a valid file name"
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<InventoryDocument> for Inventory {
    type Error = PipelineError;

    fn try_from(document: InventoryDocument) -> PipelineResult<Self> {
        let components = document
            .components
            .into_iter()
            .map(Component::try_from)
            .collect::<PipelineResult<Vec<_>>>()?;
        Inventory::new(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: &str) -> ComponentRecord {
        ComponentRecord {
            name: name.into(),
            kind: kind.into(),
            ..ComponentRecord::default()
        }
    }

    #[test]
    fn map_record_converts_with_defaults() {
        let mut r = record("CDM_FreightInvoice_To_DocPackRequest", "Map");
        r.source_schema_ref = Some("FreightInvoice".into());
        r.target_schema_ref = Some("DocPackRequest".into());

        let component = Component::try_from(r).unwrap();
        assert_eq!(component.kind(), ComponentKind::Map);
        assert_eq!(component.functoid_count(), 0);
        assert_eq!(component.source_schema_ref(), Some("FreightInvoice"));
        assert_eq!(component.target_schema_ref(), Some("DocPackRequest"));
    }

    #[test]
    fn blank_schema_refs_become_none() {
        let mut r = record("M", "map");
        r.source_schema_ref = Some("   ".into());
        let component = Component::try_from(r).unwrap();
        assert_eq!(component.source_schema_ref(), None);
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let err = Component::try_from(record("Adapter1", "Adapter")).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidComponentKind { ref component, ref kind }
                if component == "Adapter1" && kind == "Adapter"
        ));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Component::try_from(record("  ", "Map")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRecord(_)));
    }

    #[test]
    fn extraction_error_is_carried() {
        let mut r = record("Broken", "Map");
        r.extraction_error = Some("truncated btm".into());
        let component = Component::try_from(r).unwrap();
        assert_eq!(component.extraction_error(), Some("truncated btm"));
    }

    #[test]
    fn document_parses_from_yaml() {
        let doc: InventoryDocument = serde_yaml::from_str(
            r"
components:
  - name: FreightInvoice
    kind: Schema
    fields:
      - path: Invoice/InvoiceNo
        required: true
  - name: Invoice_Map
    kind: Map
    sourceSchemaRef: FreightInvoice
    targetSchemaRef: DocPackRequest
    functoidCount: 2
",
        )
        .unwrap();
        let inventory = Inventory::try_from(doc).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.get("Invoice_Map").unwrap().functoid_count(), 2);
        assert!(inventory.schema_fields("FreightInvoice").unwrap()[0].required);
    }

    #[test]
    fn names_that_would_escape_the_output_dir_are_rejected() {
        for name in ["../../escaped", "nested/Map", "win\\Map", ".."] {
            let err = Component::try_from(record(name, "Map")).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidRecord(ref m) if m.contains(name)),
                "{name}"
            );
        }
        assert!(Component::try_from(record("CDM.Invoice-v2", "Map")).is_ok());
    }

    #[test]
    fn snake_case_keys_are_accepted() {
        let doc: InventoryDocument = serde_yaml::from_str(
            r"
components:
  - name: Broken
    kind: map
    source_schema_ref: FreightInvoice
    functoid_count: 7
    extraction_error: truncated btm
",
        )
        .unwrap();
        let inventory = Inventory::try_from(doc).unwrap();
        let broken = inventory.get("Broken").unwrap();
        assert_eq!(broken.extraction_error(), Some("truncated btm"));
        assert_eq!(broken.functoid_count(), 7);
        assert_eq!(broken.source_schema_ref(), Some("FreightInvoice"));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let result: Result<InventoryDocument, _> = serde_yaml::from_str(
            r"
components:
  - name: M
    kind: map
    functiodCount: 7
",
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("functiodCount"), "{err}");
    }

    #[test]
    fn one_bad_kind_fails_the_whole_document() {
        let doc = InventoryDocument {
            components: vec![record("Good", "Schema"), record("Bad", "Spreadsheet")],
        };
        assert!(matches!(
            Inventory::try_from(doc),
            Err(PipelineError::InvalidComponentKind { .. })
        ));
    }
}
