//! Business-context hints: alias tables, defaults and enrichment declarations.
//!
//! Loaded once before classification and shared read-only by every stage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::SchemaField;

/// Project name used when the hints document does not set one.
pub const DEFAULT_PROJECT: &str = "MigratedProject";

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

/// The hints document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Hints {
    /// Name of the generated project.
    #[serde(default = "default_project")]
    pub project: String,
    /// Target field (name or path) to source field (name or path).
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Target field (name or path) to default value.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    /// Fields populated by external lookups.
    #[serde(default)]
    pub enrichments: Vec<EnrichmentHint>,
    /// Shared libraries the generated project depends on.
    #[serde(default)]
    pub libraries: Vec<String>,
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            project: default_project(),
            aliases: BTreeMap::new(),
            defaults: BTreeMap::new(),
            enrichments: Vec::new(),
            libraries: Vec::new(),
        }
    }
}

/// Declares that a target field is filled by an external lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnrichmentHint {
    /// Target field name or path.
    pub field: String,
    /// Lookup label, e.g. `company_code`.
    pub lookup: String,
    /// Restricts the hint to one component; applies everywhere when absent.
    #[serde(default)]
    pub component: Option<String>,
}

/// External lookups the generator knows how to reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// Company code resolution.
    CompanyCode,
    /// Shipment lookup by shipment ID / house bill.
    ShipmentId,
    /// Customs brokerage data.
    CustomsBrokerage,
    /// Recipient determination and routing.
    Recipient,
    /// Document type validation.
    DocumentValidation,
}

impl LookupKind {
    /// Parses a lookup label, ignoring case and `-`/`_` differences.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "company_code" => Some(Self::CompanyCode),
            "shipment_id" | "shipment" => Some(Self::ShipmentId),
            "customs_brokerage" => Some(Self::CustomsBrokerage),
            "recipient" | "eadapter_recipient" => Some(Self::Recipient),
            "document_validation" => Some(Self::DocumentValidation),
            _ => None,
        }
    }

    /// Stable snake-case label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompanyCode => "company_code",
            Self::ShipmentId => "shipment_id",
            Self::CustomsBrokerage => "customs_brokerage",
            Self::Recipient => "recipient",
            Self::DocumentValidation => "document_validation",
        }
    }

    /// Concern suffix of the enrichment module generated for this lookup.
    #[must_use]
    pub fn concern(self) -> &'static str {
        match self {
            Self::CompanyCode => "CompanyCodeLookup",
            Self::ShipmentId => "ShipmentEnrichment",
            Self::CustomsBrokerage => "CustomsBrokerage",
            Self::Recipient => "EAdapterRecipient",
            Self::DocumentValidation => "DocumentValidation",
        }
    }

    /// One-line purpose used in generated headers.
    #[must_use]
    pub fn purpose(self) -> &'static str {
        match self {
            Self::CompanyCode => "Company code resolution and validation",
            Self::ShipmentId => "Shipment data lookup by shipment ID and house bill",
            Self::CustomsBrokerage => "Customs brokerage data enrichment",
            Self::Recipient => "Recipient determination and routing",
            Self::DocumentValidation => "Document type validation and publishing checks",
        }
    }

    /// Reference table consulted by the generated lookup.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::CompanyCode => "COMPANY_CODE_XREF",
            Self::ShipmentId => "SHIPMENT",
            Self::CustomsBrokerage => "CUSTOMS_BROKERAGE",
            Self::Recipient => "EADAPTER_RECIPIENT",
            Self::DocumentValidation => "DOCUMENT_TYPE",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Hints {
    /// View of the hints as seen by one component.
    #[must_use]
    pub fn scoped<'a>(&'a self, component: &'a str) -> ScopedHints<'a> {
        ScopedHints {
            hints: self,
            component,
        }
    }
}

/// Hints filtered to a single component's enrichment declarations.
#[derive(Debug, Clone, Copy)]
pub struct ScopedHints<'a> {
    hints: &'a Hints,
    component: &'a str,
}

impl<'a> ScopedHints<'a> {
    /// Hints that apply to no component in particular.
    #[must_use]
    pub fn global(hints: &'a Hints) -> Self {
        Self {
            hints,
            component: "",
        }
    }

    /// Alias declared for a target field, by path first, then by name.
    #[must_use]
    pub fn alias_for(&self, field: &SchemaField) -> Option<&'a str> {
        self.hints
            .aliases
            .get(&field.path)
            .or_else(|| self.hints.aliases.get(field.name()))
            .map(String::as_str)
    }

    /// Default for a target field: the schema's own default wins over hints.
    #[must_use]
    pub fn default_for(&self, field: &'a SchemaField) -> Option<&'a str> {
        field.default.as_deref().or_else(|| {
            self.hints
                .defaults
                .get(&field.path)
                .or_else(|| self.hints.defaults.get(field.name()))
                .map(String::as_str)
        })
    }

    /// Enrichment hints naming this field that apply to the component.
    #[must_use]
    pub fn enrichments_for(&self, field: &SchemaField) -> Vec<&'a EnrichmentHint> {
        self.hints
            .enrichments
            .iter()
            .filter(|h| h.field == field.path || h.field == field.name())
            .filter(|h| h.component.as_deref().map_or(true, |c| c == self.component))
            .collect()
    }
}
