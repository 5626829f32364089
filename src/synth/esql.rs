//! ESQL compute-module rendering.
//!
//! Every module has the same four sections in order: parameter
//! declarations, input validation, the core transformation and error
//! handling. Concerns only change what goes inside them.

use crate::inventory::{ComponentDetail, LookupKind};
use crate::resolve::{FieldMapping, MappingRule};

use super::builder::{ArtifactBuilder, Header};
use super::{logical_name, ComponentArtifact, Concern};

const INDENT: &str = "    ";
const DATA_SOURCE: &str = "BROKER_DSN";

pub(super) fn render(header: &Header, builder: &ArtifactBuilder<'_>, concern: Concern) -> String {
    let mut lines: Vec<String> = header.lines().iter().map(|l| format!("-- {l}")).collect();
    lines.push(String::new());
    lines.push(format!(
        "CREATE COMPUTE MODULE {}",
        esql_identifier(&header.logical_name)
    ));
    lines.push(String::new());

    section(&mut lines, "Parameter declarations");
    lines.extend(parameters(header, builder, concern));
    lines.push(String::new());

    section(&mut lines, "Input validation");
    lines.extend(validation(builder, concern));
    lines.push(String::new());

    section(&mut lines, "Core transformation");
    lines.extend(core(builder, concern));
    lines.push(String::new());

    section(&mut lines, "Error handling");
    lines.extend(error_handling(concern));

    lines.push("END MODULE;".to_string());
    lines.push(String::new());
    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(format!("{INDENT}-- {title}"));
}

fn parameters(header: &Header, builder: &ArtifactBuilder<'_>, concern: Concern) -> Vec<String> {
    let mut out = vec![
        format!(
            "{INDENT}DECLARE ModuleName CONSTANT CHARACTER '{}';",
            quote(&header.logical_name)
        ),
        format!(
            "{INDENT}DECLARE SourceComponent CONSTANT CHARACTER '{}';",
            quote(builder.component.name())
        ),
    ];
    let data_source =
        format!("{INDENT}DECLARE DataSourceName EXTERNAL CHARACTER '{DATA_SOURCE}';");
    match concern {
        Concern::Enrichment(lookup) => {
            out.push(format!(
                "{INDENT}DECLARE LookupTable CONSTANT CHARACTER '{}';",
                lookup.table()
            ));
            out.push(data_source);
        }
        Concern::DatabaseOps => out.push(data_source),
        _ => {}
    }
    out
}

fn validation(builder: &ArtifactBuilder<'_>, concern: Concern) -> Vec<String> {
    let mut out = vec![
        format!("{INDENT}CREATE FUNCTION ValidateInput() RETURNS BOOLEAN"),
        format!("{INDENT}BEGIN"),
    ];
    out.extend(reject_if_null("InputRoot.XMLNSC", "Input message is null"));
    if concern == Concern::Validation {
        for mapping in builder.resolution.mappings.iter().filter(|m| m.required) {
            if let Some(source) = &mapping.source_path {
                out.extend(reject_if_null(
                    &format!("InputRoot.XMLNSC.{}", field_ref(source)),
                    &format!("Missing required field {source}"),
                ));
            }
        }
    }
    out.push(format!("{INDENT}{INDENT}RETURN TRUE;"));
    out.push(format!("{INDENT}END;"));
    out
}

fn reject_if_null(reference: &str, message: &str) -> Vec<String> {
    vec![
        format!("{INDENT}{INDENT}IF {reference} IS NULL THEN"),
        format!(
            "{INDENT}{INDENT}{INDENT}SET Environment.Variables.ValidationError = '{}';",
            quote(message)
        ),
        format!("{INDENT}{INDENT}{INDENT}RETURN FALSE;"),
        format!("{INDENT}{INDENT}END IF;"),
    ]
}

fn core(builder: &ArtifactBuilder<'_>, concern: Concern) -> Vec<String> {
    let body = format!("{INDENT}{INDENT}");
    let mut out = vec![
        format!("{INDENT}CREATE FUNCTION Main() RETURNS BOOLEAN"),
        format!("{INDENT}BEGIN"),
        format!("{body}DECLARE EXIT HANDLER FOR SQLSTATE LIKE '%'"),
        format!("{body}BEGIN"),
        format!("{body}{INDENT}CALL HandleError(SQLCODE, SQLERRORTEXT);"),
        format!("{body}{INDENT}RETURN FALSE;"),
        format!("{body}END;"),
        format!("{body}IF NOT ValidateInput() THEN"),
        format!("{body}{INDENT}CALL HandleError(0, Environment.Variables.ValidationError);"),
        format!("{body}{INDENT}RETURN FALSE;"),
        format!("{body}END IF;"),
    ];
    let statements = match concern {
        Concern::Main => main_statements(builder),
        Concern::Validation => vec![
            "SET OutputRoot = InputRoot;".to_string(),
            "SET Environment.Variables.ValidationPassed = TRUE;".to_string(),
        ],
        Concern::ErrorHandling => vec![
            "SET OutputRoot.XMLNSC.Error.Component = SourceComponent;".to_string(),
            "SET OutputRoot.XMLNSC.Error.Text = COALESCE(InputExceptionList.*[1].Text, 'unknown error');"
                .to_string(),
            "SET OutputRoot.XMLNSC.Error.Timestamp = CURRENT_TIMESTAMP;".to_string(),
        ],
        Concern::DatabaseOps => database_statements(builder),
        Concern::BusinessLogic => business_logic_statements(builder),
        Concern::Enrichment(lookup) => enrichment_statements(builder, lookup),
    };
    out.extend(statements.into_iter().map(|s| format!("{body}{s}")));
    out.push(format!("{body}RETURN TRUE;"));
    out.push(format!("{INDENT}END;"));
    out
}

fn main_statements(builder: &ArtifactBuilder<'_>) -> Vec<String> {
    let resolution = builder.resolution;
    if let ComponentDetail::Orchestration { .. } = builder.component.detail() {
        let mut out = vec![
            "SET OutputRoot = InputRoot;".to_string(),
            "SET OutputRoot.MQMD.CorrelId = InputRoot.MQMD.MsgId;".to_string(),
        ];
        for reference in &resolution.data_references {
            out.push(format!("-- routes through {reference}"));
        }
        return out;
    }
    if resolution.mappings.is_empty() {
        return vec!["SET OutputRoot = InputRoot;".to_string()];
    }
    let mut out = vec!["SET OutputRoot.Properties = InputRoot.Properties;".to_string()];
    out.extend(resolution.mappings.iter().map(|m| assignment(builder, m)));
    out
}

fn assignment(builder: &ArtifactBuilder<'_>, mapping: &FieldMapping) -> String {
    let target = format!("OutputRoot.XMLNSC.{}", field_ref(&mapping.target_path));
    match &mapping.rule {
        MappingRule::Identity | MappingRule::Renamed => {
            let source = mapping
                .source_path
                .as_deref()
                .unwrap_or(&mapping.target_path);
            format!("SET {target} = InputRoot.XMLNSC.{};", field_ref(source))
        }
        MappingRule::Defaulted { value } => format!("SET {target} = '{}';", quote(value)),
        MappingRule::Enriched { lookup } => format!(
            "SET {target} = Environment.Enrichment.{}.{}; -- {}",
            lookup.concern(),
            mapping.target_name(),
            logical_name(
                builder.component.name(),
                ComponentArtifact::Module(Concern::Enrichment(*lookup))
            ),
        ),
        MappingRule::Unresolved { reason } => format!(
            "-- UNRESOLVED {}: {reason}; manual review required",
            mapping.target_path
        ),
    }
}

fn database_statements(builder: &ArtifactBuilder<'_>) -> Vec<String> {
    let mut out = vec!["SET OutputRoot = InputRoot;".to_string()];
    for reference in &builder.resolution.data_references {
        let name = esql_identifier(reference);
        out.push(format!(
            "SET Environment.Data.{name} = PASSTHRU('SELECT * FROM {} WHERE ID = ?' TO Database.{{DataSourceName}} VALUES (InputRoot.XMLNSC.*[1].Id));",
            name.to_uppercase(),
        ));
    }
    out
}

fn business_logic_statements(builder: &ArtifactBuilder<'_>) -> Vec<String> {
    let mut out = vec!["SET OutputRoot = InputRoot;".to_string()];
    for file in builder.component.discovered_files() {
        out.push(format!("-- port logic from {file}"));
    }
    out
}

fn enrichment_statements(builder: &ArtifactBuilder<'_>, lookup: LookupKind) -> Vec<String> {
    let mut out = vec!["SET OutputRoot = InputRoot;".to_string()];
    let mappings = &builder.resolution.mappings;
    let wanted = Some(lookup);
    for mapping in mappings.iter().filter(|m| m.enrichment_ref() == wanted) {
        out.push(format!(
            "SET Environment.Enrichment.{}.{} = THE(SELECT ITEM R.VALUE FROM Database.{{DataSourceName}}.{} AS R WHERE R.FIELD_NAME = '{}');",
            lookup.concern(),
            mapping.target_name(),
            lookup.table(),
            quote(mapping.target_name()),
        ));
    }
    out
}

fn error_handling(concern: Concern) -> Vec<String> {
    let body = format!("{INDENT}{INDENT}");
    let mut out = vec![
        format!("{INDENT}CREATE PROCEDURE HandleError(IN code INTEGER, IN text CHARACTER)"),
        format!("{INDENT}BEGIN"),
        format!("{body}SET Environment.Variables.ErrorModule = ModuleName;"),
        format!("{body}SET Environment.Variables.ErrorCode = code;"),
        format!("{body}SET Environment.Variables.ErrorText = text;"),
        format!(
            "{body}LOG EVENT SEVERITY 3 CATALOG 'BIPmsgs' MESSAGE 2951 VALUES(ModuleName, text);"
        ),
    ];
    if let Concern::Enrichment(_) = concern {
        out.push(format!("{body}SET Environment.Variables.EnrichmentFailed = TRUE;"));
    }
    if concern == Concern::ErrorHandling {
        out.push(format!("{body}THROW USER EXCEPTION VALUES(code, text);"));
    }
    out.push(format!("{INDENT}END;"));
    out
}

/// Converts a slash-separated field path into an ESQL field reference.
fn field_ref(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(esql_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

fn esql_identifier(segment: &str) -> String {
    let mut ident: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Escapes a value for an ESQL character literal.
fn quote(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ComplexityTier;
    use crate::inventory::{Component, EnrichmentHint, Hints, Inventory, SchemaField};
    use crate::resolve::resolve_component;
    use crate::synth::{synthesize, ArtifactType, GeneratedArtifact};

    fn artifacts_for(map: &Component, hints: &Hints) -> Vec<GeneratedArtifact> {
        let inventory = Inventory::new(vec![
            Component::schema(
                "In",
                vec![SchemaField::new("In/Id"), SchemaField::new("In/Qty")],
            ),
            Component::schema(
                "Out",
                vec![
                    SchemaField::new("Out/Id").required(),
                    SchemaField::new("Out/Qty"),
                    SchemaField::new("Out/Status")
                        .required()
                        .with_default("NEW"),
                    SchemaField::new("Out/CompanyCode"),
                ],
            ),
            map.clone(),
        ])
        .unwrap();
        let resolution = resolve_component(map, ComplexityTier::Moderate, &inventory, hints);
        synthesize(map, ComplexityTier::Moderate, &resolution)
    }

    fn artifacts(hints: &Hints) -> Vec<GeneratedArtifact> {
        artifacts_for(&Component::map("Orders", Some("In"), Some("Out")), hints)
    }

    fn body<'a>(artifacts: &'a [GeneratedArtifact], name: &str) -> &'a str {
        artifacts
            .iter()
            .find(|a| a.logical_name() == name)
            .unwrap()
            .body()
    }

    #[test]
    fn sections_appear_in_order() {
        let artifacts = artifacts(&Hints::default());
        let modules = artifacts
            .iter()
            .filter(|a| a.artifact_type() == ArtifactType::ProceduralModule);
        for artifact in modules {
            let body = artifact.body();
            let positions: Vec<usize> = [
                "-- Parameter declarations",
                "-- Input validation",
                "-- Core transformation",
                "-- Error handling",
            ]
            .iter()
            .map(|s| body.find(s).unwrap())
            .collect();
            assert!(
                positions.windows(2).all(|w| w[0] < w[1]),
                "{}",
                artifact.logical_name()
            );
        }
    }

    #[test]
    fn header_names_component_and_tier() {
        let artifacts = artifacts(&Hints::default());
        let main = body(&artifacts, "Orders_Main");
        assert!(main.starts_with("-- Orders_Main\n"));
        assert!(main.contains("-- Source component: Orders"));
        assert!(main.contains("-- Complexity tier: moderate"));
    }

    #[test]
    fn module_identifier_is_sanitized() {
        let map = Component::map("CDM.Orders-v2 EU", Some("In"), Some("Out"));
        let artifacts = artifacts_for(&map, &Hints::default());
        let main = body(&artifacts, "CDM.Orders-v2 EU_Main");
        assert!(main.contains("CREATE COMPUTE MODULE CDM_Orders_v2_EU_Main\n"));
        assert!(main.contains("DECLARE ModuleName CONSTANT CHARACTER 'CDM.Orders-v2 EU_Main';"));
    }

    #[test]
    fn identifiers_are_ascii_and_never_start_with_a_digit() {
        assert_eq!(esql_identifier("2024_Orders"), "_2024_Orders");
        assert_eq!(esql_identifier("Größe"), "Gr__e");
        assert_eq!(esql_identifier("Invoice_No"), "Invoice_No");
    }

    #[test]
    fn main_module_assigns_each_mapping() {
        let artifacts = artifacts(&Hints::default());
        let main = body(&artifacts, "Orders_Main");
        assert!(main.contains("SET OutputRoot.XMLNSC.Out.Id = InputRoot.XMLNSC.In.Id;"));
        assert!(main.contains("SET OutputRoot.XMLNSC.Out.Status = 'NEW';"));
        assert!(main.contains("-- UNRESOLVED Out/CompanyCode"));
    }

    #[test]
    fn validation_checks_required_source_fields() {
        let artifacts = artifacts(&Hints::default());
        let validation = body(&artifacts, "Orders_Validation");
        assert!(validation.contains("IF InputRoot.XMLNSC.In.Id IS NULL THEN"));
        assert!(!validation.contains("InputRoot.XMLNSC.In.Qty IS NULL"));
    }

    #[test]
    fn enrichment_module_queries_lookup_table() {
        let mut hints = Hints::default();
        hints.enrichments.push(EnrichmentHint {
            field: "CompanyCode".into(),
            lookup: "company_code".into(),
            component: None,
        });
        let artifacts = artifacts(&hints);
        let lookup = body(&artifacts, "Orders_CompanyCodeLookup");
        assert!(lookup.contains("COMPANY_CODE_XREF"));
        assert!(lookup.contains("SET Environment.Enrichment.CompanyCodeLookup.CompanyCode"));
        let main = body(&artifacts, "Orders_Main");
        assert!(main.contains("-- Orders_CompanyCodeLookup"));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote("O'Brien"), "O''Brien");
        assert_eq!(field_ref("/A/b-c/D"), "A.b_c.D");
    }
}
