//! Parameter resolution against session state.

use serde_json::{Map, Value};

use crate::{
    error::{FlowError, Result},
    reference::{PathSegment, Reference},
    session::{ExecutionSession, ExecutionStep},
};

/// Resolves reference expressions in step parameters.
///
/// Resolution is pure: it reads the session state tree and never mutates
/// the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterResolver;

impl ParameterResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every parameter of `step` against `session`.
    pub fn resolve(
        &self,
        step: &ExecutionStep,
        session: &ExecutionSession,
    ) -> Result<Map<String, Value>> {
        let has_references = step
            .parameters
            .values()
            .any(|v| v.as_str().is_some_and(Reference::is_reference));
        if !has_references {
            return Ok(step.parameters.clone());
        }

        let tree = session.state_tree()?;
        self.resolve_parameters(&step.parameters, &tree)
    }

    /// Resolve a parameter map against an arbitrary state tree.
    pub fn resolve_parameters(
        &self,
        parameters: &Map<String, Value>,
        tree: &Value,
    ) -> Result<Map<String, Value>> {
        parameters
            .iter()
            .map(|(key, value)| -> Result<(String, Value)> {
                Ok((key.clone(), self.resolve_value(value, tree)?))
            })
            .collect()
    }

    fn resolve_value(&self, value: &Value, tree: &Value) -> Result<Value> {
        let Some(text) = value.as_str() else {
            return Ok(value.clone());
        };
        match Reference::parse(text)? {
            Some(reference) => lookup(&reference, tree).cloned(),
            None => Ok(value.clone()),
        }
    }
}

/// Walk `reference` from `root`.
pub fn lookup<'a>(reference: &Reference, root: &'a Value) -> Result<&'a Value> {
    let mut current = root;
    for segment in reference.segments() {
        current = match segment {
            PathSegment::Field(field) => field_of(reference, current, field)?,
            PathSegment::Indexed { field, index } => {
                let sequence = field_of(reference, current, field)?;
                let items = sequence.as_array().ok_or_else(|| {
                    FlowError::resolution(
                        reference.raw(),
                        format!("'{field}' is {}, not a list", kind_of(sequence)),
                    )
                })?;
                items.get(*index).ok_or_else(|| {
                    FlowError::resolution(
                        reference.raw(),
                        format!(
                            "index {index} out of range for '{field}' (length {})",
                            items.len()
                        ),
                    )
                })?
            }
        };
    }
    Ok(current)
}

fn field_of<'a>(reference: &Reference, current: &'a Value, field: &str) -> Result<&'a Value> {
    let object = current.as_object().ok_or_else(|| {
        FlowError::resolution(
            reference.raw(),
            format!("cannot look up '{field}' in {}", kind_of(current)),
        )
    })?;
    object
        .get(field)
        .ok_or_else(|| FlowError::resolution(reference.raw(), format!("missing key '{field}'")))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
