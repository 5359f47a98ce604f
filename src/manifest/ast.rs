//! Dependency manifest data model

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered list of manifest lines that carry meaning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManifestEntry {
    Requirement(Requirement),
    Directive(Directive),
}

/// A named package with optional extras, constraints, direct URL and marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: Vec<VersionSpec>,
    pub url: Option<String>,
    /// Written as a bare path or URL; `name` is then derived from it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bare_location: bool,
    pub marker: Option<String>,
    /// Per-requirement install options such as `--hash=sha256:...`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSpec {
    pub op: VersionOp,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionOp {
    Exact,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Compatible,
}

/// An installer option line such as `-r base.txt` or `--index-url URL`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub flag: String,
    pub value: Option<String>,
    pub line: usize,
}

impl Manifest {
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter().filter_map(|e| match e {
            ManifestEntry::Requirement(r) => Some(r),
            ManifestEntry::Directive(_) => None,
        })
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.entries.iter().filter_map(|e| match e {
            ManifestEntry::Directive(d) => Some(d),
            ManifestEntry::Requirement(_) => None,
        })
    }

    /// Normalized names of every requirement, in declaration order
    pub fn names(&self) -> Vec<String> {
        self.requirements().map(|r| r.normalized_name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Requirement {
    /// Package name folded for comparison: lower-case, runs of `-_.` become `-`
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Best-effort project name for a bare path or URL requirement
pub fn location_name(location: &str) -> String {
    if let Some((_, fragment)) = location.split_once('#') {
        if let Some(egg) = fragment.split('&').find_map(|p| p.strip_prefix("egg=")) {
            return egg.to_string();
        }
    }

    let path = location.split(['#', '?']).next().unwrap_or(location);
    let file = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    // Wheel file names escape `-` inside the project name
    if let Some(stem) = file.strip_suffix(".whl") {
        return stem.split('-').next().unwrap_or(stem).to_string();
    }

    let stem = [".tar.gz", ".tar.bz2", ".tgz", ".zip", ".git"]
        .iter()
        .find_map(|ext| file.strip_suffix(ext))
        .unwrap_or(file);
    match stem.rfind('-') {
        Some(i) if stem[i + 1..].starts_with(|c: char| c.is_ascii_digit()) => stem[..i].to_string(),
        _ => stem.to_string(),
    }
}

pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_sep {
                out.push('-');
            }
            last_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        }
    }
    out
}

impl VersionOp {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "===" => VersionOp::Exact,
            "==" => VersionOp::Equal,
            "!=" => VersionOp::NotEqual,
            "<=" => VersionOp::LessEqual,
            ">=" => VersionOp::GreaterEqual,
            "<" => VersionOp::Less,
            ">" => VersionOp::Greater,
            "~=" => VersionOp::Compatible,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOp::Exact => "===",
            VersionOp::Equal => "==",
            VersionOp::NotEqual => "!=",
            VersionOp::LessEqual => "<=",
            VersionOp::GreaterEqual => ">=",
            VersionOp::Less => "<",
            VersionOp::Greater => ">",
            VersionOp::Compatible => "~=",
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.url, self.bare_location) {
            (Some(url), true) => write!(f, "{}", url)?,
            (url, _) => {
                write!(f, "{}", self.name)?;
                if !self.extras.is_empty() {
                    write!(f, "[{}]", self.extras.join(","))?;
                }
                if let Some(url) = url {
                    write!(f, " @ {}", url)?;
                } else {
                    let specs: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
                    write!(f, "{}", specs.join(","))?;
                }
            }
        }
        if let Some(marker) = &self.marker {
            // A URL needs whitespace before the marker separator
            let sep = if self.url.is_some() { " ; " } else { "; " };
            write!(f, "{}{}", sep, marker)?;
        }
        for option in &self.options {
            write!(f, " {}", option)?;
        }
        Ok(())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {}", self.flag, value),
            None => write!(f, "{}", self.flag),
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestEntry::Requirement(r) => r.fmt(f),
            ManifestEntry::Directive(d) => d.fmt(f),
        }
    }
}
