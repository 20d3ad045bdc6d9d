//! Response materialization.
//!
//! Produces a response body by cloning the endpoint's template and writing
//! each resolved binding into the clone at its dotted field path.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::types::Binding;
use crate::template::extract::{extract, ParameterBag};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterializeError {
    /// The template root is a scalar, so no field can be written into it.
    #[error("cannot write field `{0}` into a scalar template")]
    ScalarRoot(String),
}

/// How far past the end of an array a write may land. Farther writes are
/// skipped instead of padding the array.
pub const MAX_ARRAY_GROWTH: usize = 1_000;

/// Per-call binding counts, for logging and metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    pub applied: usize,
    pub skipped: usize,
}

/// Clone `template` and apply every binding that resolves against `bag`.
///
/// Unresolved bindings are skipped. The template itself is never modified.
pub fn materialize(
    template: &Value,
    bindings: &BTreeMap<String, Binding>,
    bag: &ParameterBag,
) -> Result<(Value, MaterializeStats), MaterializeError> {
    let mut body = if is_falsy(template) {
        Value::Object(Map::new())
    } else {
        template.clone()
    };
    let mut stats = MaterializeStats::default();

    for (field_path, binding) in bindings {
        let Some(value) = extract(bag, binding.source, &binding.path) else {
            tracing::trace!(field = %field_path, source = ?binding.source, path = %binding.path, "Binding unresolved");
            stats.skipped += 1;
            continue;
        };

        if !matches!(body, Value::Object(_) | Value::Array(_)) {
            return Err(MaterializeError::ScalarRoot(field_path.clone()));
        }

        if set_nested(&mut body, field_path, value.clone()) {
            stats.applied += 1;
        } else {
            tracing::debug!(field = %field_path, "Field path not writable, skipped");
            stats.skipped += 1;
        }
    }

    Ok((body, stats))
}

/// `null`, `false`, zero and `""` templates are served as an empty object.
fn is_falsy(template: &Value) -> bool {
    match template {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Write `value` at the dotted `path` inside `root`.
///
/// Missing or scalar intermediate nodes are replaced by empty objects.
/// Arrays are indexed numerically and padded with `null` when written past
/// the end, by at most [`MAX_ARRAY_GROWTH`] slots. Returns `false` when the
/// write is dropped: a non-numeric key on an array, or an index too far out.
pub fn set_nested(root: &mut Value, path: &str, value: Value) -> bool {
    let keys: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = keys.split_last() else {
        return false;
    };

    let mut current = root;
    for key in parents {
        let Some(slot) = child_slot(current, key) else {
            return false;
        };
        if !matches!(slot, Value::Object(_) | Value::Array(_)) {
            *slot = Value::Object(Map::new());
        }
        current = slot;
    }

    match child_slot(current, last) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Mutable slot for `key` in a container, created if absent.
fn child_slot<'a>(container: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match container {
        Value::Object(map) => Some(map.entry(key.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = key.parse::<usize>().ok()?;
            if index >= items.len() {
                if index - items.len() >= MAX_ARRAY_GROWTH {
                    return None;
                }
                items.resize(index.checked_add(1)?, Value::Null);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}
