//! Path pattern matching module
//!
//! Patterns are `/`-separated segments; a segment starting with `:` captures
//! exactly one path segment under that name.

use percent_encoding::percent_decode_str;
use std::fmt;

/// One segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed route pattern, e.g. `/api/v1/projects/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Parameters captured while matching a path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning captured params on success
    ///
    /// Segments are split on the raw path, so an encoded `%2F` stays inside
    /// one param. Captured values are then percent-decoded (invalid UTF-8 is
    /// replaced with U+FFFD); a param may capture an empty segment.
    pub fn matches(&self, path: &str) -> Option<Params> {
        if !path.starts_with('/') {
            return None;
        }

        let mut params = Vec::new();
        let mut parts = split_path(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => params.push((name.clone(), decode_segment(part))),
            }
        }

        // Extra trailing segments mean a different route
        if parts.next().is_some() {
            return None;
        }

        Some(Params(params))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode_segment(part: &str) -> String {
    percent_decode_str(part).decode_utf8_lossy().into_owned()
}

/// Split a path into segments, dropping only the leading `/`
fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}
