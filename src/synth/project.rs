//! Toolkit `.project` descriptor.

use super::builder::Header;

const BUILDER: &str = "com.ibm.etools.mft.flow.msgflowbuilder";
const NATURES: [&str; 2] = [
    "com.ibm.etools.msgbroker.tooling.applicationNature",
    "com.ibm.etools.msgbroker.tooling.messageBrokerProjectNature",
];

pub(super) fn render(project: &str, libraries: &[String]) -> String {
    let header = Header {
        logical_name: project.to_string(),
        component: None,
        tier: None,
        purpose: "Toolkit project descriptor".to_string(),
    };

    let mut out = vec![r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string()];
    for line in header.lines() {
        out.push(format!("<!-- {} -->", escape(&line)));
    }
    out.push("<projectDescription>".to_string());
    out.push(format!("\t<name>{}</name>", escape(project)));
    out.push("\t<comment></comment>".to_string());
    out.push("\t<projects>".to_string());
    let mut seen: Vec<&str> = Vec::new();
    for library in libraries.iter().filter(|l| !l.trim().is_empty()) {
        if !seen.contains(&library.as_str()) {
            seen.push(library);
            out.push(format!("\t\t<project>{}</project>", escape(library)));
        }
    }
    out.push("\t</projects>".to_string());
    out.push("\t<buildSpec>".to_string());
    out.push("\t\t<buildCommand>".to_string());
    out.push(format!("\t\t\t<name>{BUILDER}</name>"));
    out.push("\t\t\t<arguments>".to_string());
    out.push("\t\t\t</arguments>".to_string());
    out.push("\t\t</buildCommand>".to_string());
    out.push("\t</buildSpec>".to_string());
    out.push("\t<natures>".to_string());
    out.extend(NATURES.iter().map(|n| format!("\t\t<nature>{n}</nature>")));
    out.push("\t</natures>".to_string());
    out.push("</projectDescription>".to_string());
    out.push(String::new());
    out.join("\n")
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace("--", "- -")
}
