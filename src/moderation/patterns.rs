//! Pattern layer: case-insensitive regular expressions for structural
//! prompt-injection attempts.
//!
//! The built-in list can be extended from config (`extra_patterns`) or a TOML
//! file with a top-level `patterns = [...]` array.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{CompanionError, Result};

pub const DEFAULT_PATTERNS: &[&str] = &[
    r"ignore\s+(all|your|these|any|the)\s+(\w+\s+)?(instructions|training|role|rules|programming)",
    r"you\s+(are|were)\s+(programmed|designed|trained|built|created)\b",
    r"from\s+now\s+on,?\s+you\s+(are|will\s+be)\b",
    r"(enter|switch\s+to|activate)\s+\S+\s+mode\b",
    r"disregard\s+(all\s+|any\s+)?(previous|prior|above|earlier)\b",
    r"pretend\s+(to\s+be|you\s+are)\s+(an?\s+)?(ai|assistant|chatbot|bot)\b",
    r"(reveal|show|print|repeat)\s+(me\s+)?(your|the)\s+(system\s+|hidden\s+)?(prompt|instructions)",
    r"\[/?(inst|system)\]",
];

#[derive(Debug, Deserialize)]
struct PatternFile {
    #[serde(default)]
    patterns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile `sources` case-insensitively. Any invalid expression fails the
    /// whole set.
    pub fn new<I, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = sources
            .into_iter()
            .map(|src| {
                let src = src.as_ref();
                RegexBuilder::new(src)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| CompanionError::Config(format!("invalid pattern {src:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_PATTERNS).expect("built-in patterns compile")
    }

    /// Read extra pattern sources from a TOML file.
    pub fn read_file(path: &Path) -> Result<Vec<String>> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CompanionError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let file: PatternFile = toml::from_str(&contents).map_err(|e| {
            CompanionError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        Ok(file.patterns)
    }

    /// Built-in patterns followed by `extra`.
    pub fn with_defaults<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources: Vec<String> = DEFAULT_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .chain(extra.into_iter().map(|s| s.as_ref().to_string()))
            .collect();
        Self::new(sources)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.as_str())
    }

    /// Source of the first pattern found in `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(text))
            .map(|p| p.as_str())
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::defaults()
    }
}
