//! PMD XML report parsing.
//!
//! Reports come either with the `http://pmd.sourceforge.net/report/2.0.0`
//! default namespace or without any namespace. The root element decides
//! which, once per document; element matching then goes through
//! `ReportDocument::is_element`.
//!
//! File names are made relative to the analyzed tree when they lie inside it.

use std::path::Path;

use roxmltree::{Document, Node};

use crate::models::{AnalysisResult, ViolationRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDocument {
    Namespaced(String),
    Bare,
}

impl ReportDocument {
    pub fn detect(root: Node) -> Self {
        match root.tag_name().namespace() {
            Some(ns) => ReportDocument::Namespaced(ns.to_string()),
            None => ReportDocument::Bare,
        }
    }

    fn is_element(&self, node: &Node, local: &str) -> bool {
        if !node.is_element() || node.tag_name().name() != local {
            return false;
        }
        match self {
            ReportDocument::Namespaced(ns) => node.tag_name().namespace() == Some(ns.as_str()),
            ReportDocument::Bare => node.tag_name().namespace().is_none(),
        }
    }
}

/// Parse a report. Malformed XML yields an empty result carrying the parse error.
pub fn parse_report(xml: &str, tree: &Path) -> AnalysisResult {
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("Could not parse analyzer report: {}", e);
            return AnalysisResult::unparseable(e.to_string());
        }
    };

    let root = doc.root_element();
    let kind = ReportDocument::detect(root);

    let mut violations = Vec::new();
    for file in root.descendants().filter(|n| kind.is_element(n, "file")) {
        let name = relative_name(file.attribute("name").unwrap_or(""), tree);

        for node in file.descendants().filter(|n| kind.is_element(n, "violation")) {
            violations.push(ViolationRecord {
                file: name.clone(),
                line: number(&node, "beginline"),
                column: number(&node, "begincolumn"),
                end_line: number(&node, "endline"),
                end_column: number(&node, "endcolumn"),
                rule: node.attribute("rule").unwrap_or("").to_string(),
                ruleset: node.attribute("ruleset").unwrap_or("").to_string(),
                priority: node
                    .attribute("priority")
                    .and_then(|p| p.trim().parse().ok())
                    .unwrap_or(0),
                message: node.text().map(str::trim).unwrap_or("").to_string(),
            });
        }
    }

    AnalysisResult::from_violations(violations)
}

fn number(node: &Node, attribute: &str) -> u32 {
    node.attribute(attribute)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn relative_name(name: &str, tree: &Path) -> String {
    let path = Path::new(name);
    let rel = match path.strip_prefix(tree) {
        Ok(rel) => rel.to_path_buf(),
        // PMD may report the canonical form of a symlinked tree
        Err(_) => match tree
            .canonicalize()
            .ok()
            .and_then(|canonical| path.strip_prefix(canonical).ok().map(Path::to_path_buf))
        {
            Some(rel) => rel,
            None => return name.to_string(),
        },
    };

    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
