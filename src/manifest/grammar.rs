//! Pest grammar parser for requirements manifests

use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::fs;
use std::path::Path;

use crate::error::{AssistError, Result};
use crate::manifest::ast::*;

#[derive(Parser)]
#[grammar = "manifest/requirements.pest"]
pub struct ManifestParser;

/// Parse manifest text into its ordered entries
pub fn parse_manifest(input: &str) -> Result<Manifest> {
    let pairs = ManifestParser::parse(Rule::manifest, input).map_err(|e| {
        let line = match e.line_col {
            LineColLocation::Pos((line, _)) => line,
            LineColLocation::Span((line, _), _) => line,
        };
        AssistError::Manifest {
            line,
            message: e.variant.message().to_string(),
        }
    })?;

    let root = pairs.into_iter().next().ok_or_else(|| AssistError::Manifest {
        line: 1,
        message: "empty input".to_string(),
    })?;

    let mut entries = Vec::new();
    for line in root.into_inner() {
        if line.as_rule() != Rule::line {
            continue;
        }
        let line_no = line.as_span().start_pos().line_col().0;
        if let Some(entry) = line.into_inner().next() {
            entries.push(parse_entry(entry, line_no)?);
        }
    }

    Ok(Manifest { entries })
}

/// Read and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        AssistError::Dependency(format!("cannot read manifest {}: {}", path.display(), e))
    })?;
    parse_manifest(&content)
}

fn parse_entry(pair: Pair<Rule>, line: usize) -> Result<ManifestEntry> {
    match pair.as_rule() {
        Rule::directive => Ok(ManifestEntry::Directive(parse_directive(pair, line))),
        Rule::requirement => Ok(ManifestEntry::Requirement(parse_requirement(pair, line)?)),
        other => Err(AssistError::Manifest {
            line,
            message: format!("unexpected rule {:?}", other),
        }),
    }
}

fn parse_directive(pair: Pair<Rule>, line: usize) -> Directive {
    let mut flag = String::new();
    let mut value = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::flag => flag = inner.as_str().to_string(),
            Rule::directive_value => value = Some(inner.as_str().to_string()),
            _ => {}
        }
    }
    Directive { flag, value, line }
}

fn parse_requirement(pair: Pair<Rule>, line: usize) -> Result<Requirement> {
    let mut req = Requirement {
        name: String::new(),
        extras: Vec::new(),
        specifiers: Vec::new(),
        url: None,
        bare_location: false,
        marker: None,
        options: Vec::new(),
        line,
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => req.name = inner.as_str().to_string(),
            Rule::extras => {
                req.extras = inner.into_inner().map(|e| e.as_str().to_string()).collect();
            }
            Rule::specifiers => {
                for spec in inner.into_inner() {
                    req.specifiers.push(parse_specifier(spec, line)?);
                }
            }
            Rule::location => {
                let location = inner.as_str().to_string();
                req.name = location_name(&location);
                req.url = Some(location);
                req.bare_location = true;
            }
            Rule::req_option => req.options.push(parse_option(inner)),
            Rule::url_ref => {
                req.url = inner.into_inner().next().map(|u| u.as_str().to_string());
            }
            Rule::marker => {
                let text = inner
                    .into_inner()
                    .next()
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                if text.is_empty() {
                    return Err(AssistError::Manifest {
                        line,
                        message: "empty environment marker".to_string(),
                    });
                }
                req.marker = Some(text);
            }
            _ => {}
        }
    }

    Ok(req)
}

fn parse_option(pair: Pair<Rule>) -> String {
    let mut parts = pair.into_inner();
    let flag = parts.next().map(|p| p.as_str()).unwrap_or_default();
    match parts.next() {
        Some(value) => format!("{}={}", flag, value.as_str()),
        None => flag.to_string(),
    }
}

fn parse_specifier(pair: Pair<Rule>, line: usize) -> Result<VersionSpec> {
    let mut parts = pair.into_inner();
    let op_str = parts.next().map(|p| p.as_str()).unwrap_or_default();
    let version = parts.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    let op = VersionOp::parse(op_str).ok_or_else(|| AssistError::Manifest {
        line,
        message: format!("unknown version operator '{}'", op_str),
    })?;
    Ok(VersionSpec { op, version })
}
