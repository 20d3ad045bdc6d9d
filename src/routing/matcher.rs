//! Path template matching.
//!
//! # Responsibilities
//! - Parse a path template (`/users/:id`, `/orders/{orderId}/items`) into segments
//! - Decide whether a concrete request path matches the template
//! - Extract named captures from the concrete path
//!
//! # Design Decisions
//! - Both sides are split on `/` with empty segments discarded
//! - Capture values are taken verbatim (no extra URL-decoding)
//! - Two modes: `Strict` compares literals and segment counts, `Loose` only
//!   aligns captures over the shared prefix of segments

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named captures extracted from a concrete path.
pub type PathParams = BTreeMap<String, String>;

/// How strictly a concrete path must agree with a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Literal segments must be equal and both paths must have the same
    /// number of segments.
    #[default]
    Strict,
    /// Only the first `min(template, actual)` segments are looked at and
    /// literal segments are never compared.
    Loose,
}

/// Errors raised while parsing a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path template is empty")]
    Empty,

    #[error("capture `{0}` appears more than once")]
    DuplicateCapture(String),

    #[error("capture segment `{0}` has no name")]
    UnnamedCapture(String),
}

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            return Segment::Capture(name.to_string());
        }
        if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
            return Segment::Capture(raw[1..raw.len() - 1].to_string());
        }
        Segment::Literal(raw.to_string())
    }
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a template, rejecting empty templates, nameless captures and
    /// duplicate capture names.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if template.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        let segments: Vec<Segment> = split_segments(template).map(Segment::parse).collect();

        let mut seen = Vec::new();
        for (segment, raw) in segments.iter().zip(split_segments(template)) {
            if let Segment::Capture(name) = segment {
                if name.is_empty() {
                    return Err(PatternError::UnnamedCapture(raw.to_string()));
                }
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateCapture(name.clone()));
                }
                seen.push(name);
            }
        }

        Ok(Self { segments })
    }

    /// Match a concrete path, returning the captured parameters.
    pub fn match_path(&self, path: &str, mode: MatchMode) -> Option<PathParams> {
        let actual: Vec<&str> = split_segments(path).collect();

        if mode == MatchMode::Strict && actual.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, value) in self.segments.iter().zip(actual.iter()) {
            match segment {
                Segment::Capture(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
                Segment::Literal(literal) => {
                    if mode == MatchMode::Strict && literal != value {
                        return None;
                    }
                }
            }
        }

        Some(params)
    }

    /// Number of literal segments, used to rank competing matches.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Canonical form of the template (`{name}` captures rewritten as `:name`).
    pub fn normalized(&self) -> String {
        self.to_string()
    }

    /// Shape of the template with capture names erased. Two templates with
    /// the same key match exactly the same paths.
    pub fn route_key(&self) -> String {
        let mut key = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => {
                    key.push('/');
                    key.push_str(s);
                }
                Segment::Capture(_) => key.push_str("/:"),
            }
        }
        if key.is_empty() {
            key.push('/');
        }
        key
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => write!(f, "/{}", s)?,
                Segment::Capture(name) => write!(f, "/:{}", name)?,
            }
        }
        Ok(())
    }
}

/// Split a path on `/`, dropping empty segments.
pub fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
