//! XSL stylesheet rendering for map transforms.
//!
//! Layout is fixed: a root template, an identity template and a default
//! leaf-copy template, followed by one explicit template per mapping that is
//! not plain identity. Source elements are matched on `local-name()` so the
//! stylesheet works regardless of the prefixes the source document uses.

use crate::resolve::{FieldMapping, MappingRule, TargetEnvelope};

use super::builder::{ArtifactBuilder, Header};

const XSL_NS: &str = "http://www.w3.org/1999/XSL/Transform";
const TARGET_PREFIX: &str = "tns";

pub(super) fn render(header: &Header, builder: &ArtifactBuilder<'_>) -> String {
    let fallback;
    let envelope = if let Some(target) = &builder.resolution.target {
        target
    } else {
        fallback = TargetEnvelope {
            schema: builder.component.name().to_string(),
            namespace: None,
            root: builder.component.name().to_string(),
        };
        &fallback
    };
    let names = Names {
        namespace: envelope.namespace.as_deref(),
    };
    let mappings = &builder.resolution.mappings;

    let mut out = vec![r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string()];
    for line in header.lines() {
        out.push(format!("<!-- {} -->", comment(&line)));
    }
    out.push(match envelope.namespace.as_deref() {
        Some(ns) => format!(
            r#"<xsl:stylesheet version="1.0" xmlns:xsl="{XSL_NS}" xmlns:{TARGET_PREFIX}="{}">"#,
            escape(ns)
        ),
        None => format!(r#"<xsl:stylesheet version="1.0" xmlns:xsl="{XSL_NS}">"#),
    });
    out.push(r#"    <xsl:output method="xml" indent="yes" encoding="UTF-8"/>"#.to_string());
    out.push(r#"    <xsl:strip-space elements="*"/>"#.to_string());
    for mapping in mappings.iter().filter(|m| m.enrichment_ref().is_some()) {
        out.push(format!(
            r#"    <xsl:param name="{}"/>"#,
            template_name("enrich", mapping)
        ));
    }
    out.push(String::new());

    out.extend(root_template(&names, &envelope.root, mappings));
    out.extend(identity_template());
    out.extend(default_template(&names));
    for mapping in mappings {
        out.extend(explicit_template(&names, mapping));
    }

    out.push("</xsl:stylesheet>".to_string());
    out.push(String::new());
    out.join("\n")
}

struct Names<'a> {
    namespace: Option<&'a str>,
}

impl Names<'_> {
    fn qualified(&self, local: &str) -> String {
        let local = escape(local);
        match self.namespace {
            Some(_) => format!("{TARGET_PREFIX}:{local}"),
            None => local,
        }
    }
}

fn root_template(names: &Names<'_>, root: &str, mappings: &[FieldMapping]) -> Vec<String> {
    let root = names.qualified(root);
    let mut out = vec![
        "    <!-- Root template -->".to_string(),
        r#"    <xsl:template match="/">"#.to_string(),
        format!("        <{root}>"),
        r#"            <xsl:apply-templates select="*/*"/>"#.to_string(),
    ];
    for mapping in mappings {
        let kind = match mapping.rule {
            MappingRule::Defaulted { .. } => "default",
            MappingRule::Enriched { .. } => "enrich",
            _ => continue,
        };
        out.push(format!(
            r#"            <xsl:call-template name="{}"/>"#,
            template_name(kind, mapping)
        ));
    }
    out.push(format!("        </{root}>"));
    out.push("    </xsl:template>".to_string());
    out.push(String::new());
    out
}

fn identity_template() -> Vec<String> {
    [
        "    <!-- Identity template -->",
        r#"    <xsl:template match="@*|node()">"#,
        "        <xsl:copy>",
        r#"            <xsl:apply-templates select="@*|node()"/>"#,
        "        </xsl:copy>",
        "    </xsl:template>",
        "",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_template(names: &Names<'_>) -> Vec<String> {
    let element = match names.namespace {
        Some(ns) => format!(
            r#"<xsl:element name="{{local-name()}}" namespace="{}">"#,
            escape(ns)
        ),
        None => r#"<xsl:element name="{local-name()}">"#.to_string(),
    };
    vec![
        "    <!-- Default template: copy leaf values, drop empty ones -->".to_string(),
        r#"    <xsl:template match="*[not(*)]">"#.to_string(),
        r#"        <xsl:if test="normalize-space(.) != ''">"#.to_string(),
        format!("            {element}"),
        r#"                <xsl:value-of select="."/>"#.to_string(),
        "            </xsl:element>".to_string(),
        "        </xsl:if>".to_string(),
        "    </xsl:template>".to_string(),
        String::new(),
    ]
}

fn explicit_template(names: &Names<'_>, mapping: &FieldMapping) -> Vec<String> {
    let target = names.qualified(mapping.target_name());
    let target_path = comment(&mapping.target_path);
    match &mapping.rule {
        MappingRule::Identity => Vec::new(),
        MappingRule::Renamed => {
            let source = mapping.source_path.as_deref().unwrap_or_default();
            vec![
                format!("    <!-- renamed: {} -> {target_path} -->", comment(source)),
                format!(
                    r#"    <xsl:template match="{}" priority="2">"#,
                    source_pattern(source)
                ),
                r#"        <xsl:if test="normalize-space(.) != ''">"#.to_string(),
                format!(r#"            <{target}><xsl:value-of select="."/></{target}>"#),
                "        </xsl:if>".to_string(),
                "    </xsl:template>".to_string(),
                String::new(),
            ]
        }
        MappingRule::Defaulted { value } => vec![
            format!("    <!-- defaulted: {target_path} -->"),
            format!(
                r#"    <xsl:template name="{}">"#,
                template_name("default", mapping)
            ),
            format!("        <{target}>{}</{target}>", escape(value)),
            "    </xsl:template>".to_string(),
            String::new(),
        ],
        MappingRule::Enriched { lookup } => {
            let param = template_name("enrich", mapping);
            vec![
                format!("    <!-- enriched: {target_path} via {lookup} -->"),
                format!(r#"    <xsl:template name="{param}">"#),
                format!(r#"        <xsl:if test="normalize-space(${param}) != ''">"#),
                format!(r#"            <{target}><xsl:value-of select="${param}"/></{target}>"#),
                "        </xsl:if>".to_string(),
                "    </xsl:template>".to_string(),
                String::new(),
            ]
        }
        MappingRule::Unresolved { reason } => vec![
            format!(
                "    <!-- UNRESOLVED: {target_path} ({}); manual review required -->",
                comment(&reason.to_string())
            ),
            String::new(),
        ],
    }
}

/// Namespace-agnostic match pattern for a slash-separated source path.
fn source_pattern(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| format!("*[local-name()='{}']", escape(s)))
        .collect::<Vec<_>>()
        .join("/")
}

fn template_name(kind: &str, mapping: &FieldMapping) -> String {
    let id: String = mapping
        .target_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    format!("{kind}-{}", id.trim_matches('-'))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// XML comments may not contain `--`.
fn comment(text: &str) -> String {
    escape(text).replace("--", "- -")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ComplexityTier;
    use crate::inventory::{
        Component, ComponentDetail, EnrichmentHint, Hints, Inventory, SchemaField,
    };
    use crate::resolve::resolve_component;
    use crate::synth::{synthesize, ArtifactType};

    fn transform(namespace: Option<&str>, hints: &Hints) -> String {
        let map = Component::map("Ship", Some("Src"), Some("Dst"));
        let dst = Component::new(
            "Dst",
            ComponentDetail::Schema {
                namespace: namespace.map(String::from),
                root: Some("Shipment".into()),
                fields: vec![
                    SchemaField::new("Shipment/Id").required(),
                    SchemaField::new("Shipment/Weight"),
                    SchemaField::new("Shipment/Mode")
                        .required()
                        .with_default("SEA"),
                    SchemaField::new("Shipment/CompanyCode"),
                    SchemaField::new("Shipment/Notes"),
                ],
            },
        );
        let inventory = Inventory::new(vec![
            Component::schema(
                "Src",
                vec![
                    SchemaField::new("Consignment/Id"),
                    SchemaField::new("Consignment/Kg"),
                ],
            ),
            dst,
            map.clone(),
        ])
        .unwrap();
        let resolution = resolve_component(&map, ComplexityTier::Simple, &inventory, hints);
        synthesize(&map, ComplexityTier::Simple, &resolution)
            .into_iter()
            .find(|a| a.artifact_type() == ArtifactType::StyleTransform)
            .unwrap()
            .body()
            .to_string()
    }

    fn hints() -> Hints {
        let mut hints = Hints::default();
        hints.aliases.insert("Weight".into(), "Kg".into());
        hints.enrichments.push(EnrichmentHint {
            field: "CompanyCode".into(),
            lookup: "company_code".into(),
            component: None,
        });
        hints
    }

    #[test]
    fn canonical_templates_precede_explicit_ones() {
        let xsl = transform(None, &hints());
        let root = xsl.find("<!-- Root template -->").unwrap();
        let identity = xsl.find("<!-- Identity template -->").unwrap();
        let default = xsl.find("<!-- Default template").unwrap();
        let renamed = xsl.find("<!-- renamed:").unwrap();
        assert!(root < identity && identity < default && default < renamed);
    }

    #[test]
    fn renamed_fields_match_on_local_name() {
        let xsl = transform(None, &hints());
        assert!(xsl.contains(
            r#"<xsl:template match="*[local-name()='Consignment']/*[local-name()='Kg']" priority="2">"#
        ));
        assert!(xsl.contains("<Weight><xsl:value-of select=\".\"/></Weight>"));
    }

    #[test]
    fn defaults_and_enrichments_are_called_from_root() {
        let xsl = transform(None, &hints());
        assert!(xsl.contains(r#"<xsl:call-template name="default-Shipment-Mode"/>"#));
        assert!(xsl.contains(r#"<xsl:call-template name="enrich-Shipment-CompanyCode"/>"#));
        assert!(xsl.contains(r#"<xsl:param name="enrich-Shipment-CompanyCode"/>"#));
        assert!(xsl.contains("<Mode>SEA</Mode>"));
    }

    #[test]
    fn unresolved_fields_are_flagged() {
        let xsl = transform(None, &hints());
        assert!(xsl.contains("<!-- UNRESOLVED: Shipment/Notes"));
    }

    #[test]
    fn namespaced_target_uses_prefix() {
        let xsl = transform(Some("urn:freight:shipment"), &hints());
        assert!(xsl.contains(r#"xmlns:tns="urn:freight:shipment""#));
        assert!(xsl.contains("<tns:Shipment>"));
        assert!(xsl.contains(r#"namespace="urn:freight:shipment""#));
    }

    #[test]
    fn escaping_covers_markup_and_comments() {
        assert_eq!(escape("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
        assert_eq!(comment("x--y"), "x- -y");
    }
}
