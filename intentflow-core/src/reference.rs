//! Reference expressions: `"{results.step_1.result.items[0]}"`.
//!
//! A parameter value that is a string wrapped in exactly one pair of braces
//! is a dotted path into the session state tree. Each segment is either a
//! field name or a field name followed by a non-negative `[index]`.

use std::fmt;

use crate::error::{FlowError, Result};

/// One step of a reference path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Look up a key in an object.
    Field(String),
    /// Look up a key, then index into the resulting array.
    Indexed { field: String, index: usize },
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(field) => f.write_str(field),
            PathSegment::Indexed { field, index } => write!(f, "{field}[{index}]"),
        }
    }
}

/// A parsed reference expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    raw: String,
    segments: Vec<PathSegment>,
}

impl Reference {
    /// True when `value` has the brace-wrapped reference shape.
    pub fn is_reference(value: &str) -> bool {
        value.len() >= 2
            && value.starts_with('{')
            && value.ends_with('}')
            && !value[1..value.len() - 1].contains(['{', '}'])
    }

    /// Parse a reference string.
    ///
    /// Returns `Ok(None)` when the value is not a reference at all, and an
    /// error naming the original string when it is one but is malformed.
    pub fn parse(value: &str) -> Result<Option<Self>> {
        if !Self::is_reference(value) {
            return Ok(None);
        }

        let interior = &value[1..value.len() - 1];
        if interior.trim().is_empty() {
            return Err(FlowError::resolution(value, "empty reference path"));
        }

        let segments = interior
            .split('.')
            .map(|segment| parse_segment(value, segment))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Self {
            raw: value.to_string(),
            segments,
        }))
    }

    /// The original string, braces included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(raw: &str, segment: &str) -> Result<PathSegment> {
    if segment.is_empty() {
        return Err(FlowError::resolution(raw, "empty path segment"));
    }

    let Some(open) = segment.find('[') else {
        if segment.contains(']') {
            return Err(FlowError::resolution(
                raw,
                format!("unbalanced bracket in segment '{segment}'"),
            ));
        }
        return Ok(PathSegment::Field(segment.to_string()));
    };

    if !segment.ends_with(']') {
        return Err(FlowError::resolution(
            raw,
            format!("segment '{segment}' must end with ']'"),
        ));
    }

    let field = &segment[..open];
    let index_text = &segment[open + 1..segment.len() - 1];
    if field.is_empty() {
        return Err(FlowError::resolution(
            raw,
            format!("segment '{segment}' has no field name before '['"),
        ));
    }

    let index = index_text.parse::<usize>().map_err(|_| {
        FlowError::resolution(
            raw,
            format!("invalid index '{index_text}' in segment '{segment}'"),
        )
    })?;

    Ok(PathSegment::Indexed {
        field: field.to_string(),
        index,
    })
}
