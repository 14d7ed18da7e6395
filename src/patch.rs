//! JSON Patch (RFC 6902) documents applied to a JSON projection of a record.
//!
//! A document is applied atomically: every operation runs against a scratch
//! copy and the target is only replaced once all of them succeed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("`{0}` is not a valid JSON pointer")]
    InvalidPointer(String),
    #[error("the target location `{0}` was not found")]
    PathNotFound(String),
    #[error("the current value at `{0}` does not match the test value")]
    TestFailed(String),
    #[error("cannot move `{from}` into its own child `{path}`")]
    MoveIntoChild { from: String, path: String },
}

impl PatchError {
    /// Pointer of the location the failing operation addressed.
    pub fn path(&self) -> &str {
        match self {
            PatchError::InvalidPointer(p)
            | PatchError::PathNotFound(p)
            | PatchError::TestFailed(p) => p,
            PatchError::MoveIntoChild { path, .. } => path,
        }
    }
}

impl PatchDocument {
    pub fn apply(&self, target: &mut Value) -> Result<(), PatchError> {
        let mut scratch = target.clone();
        for op in &self.0 {
            apply_operation(&mut scratch, op)?;
        }
        *target = scratch;
        Ok(())
    }
}

fn apply_operation(root: &mut Value, op: &PatchOperation) -> Result<(), PatchError> {
    match op {
        PatchOperation::Add { path, value } => add(root, path, value.clone()),
        PatchOperation::Remove { path } => remove(root, path).map(drop),
        PatchOperation::Replace { path, value } => {
            let tokens = parse_pointer(path)?;
            let slot = lookup_mut(root, &tokens).ok_or_else(|| not_found(path))?;
            *slot = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if from == path {
                return lookup(root, &parse_pointer(from)?).map(drop).ok_or_else(|| not_found(from));
            }
            if path.starts_with(&format!("{from}/")) {
                return Err(PatchError::MoveIntoChild { from: from.clone(), path: path.clone() });
            }
            let value = remove(root, from)?;
            add(root, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = lookup(root, &parse_pointer(from)?).cloned().ok_or_else(|| not_found(from))?;
            add(root, path, value)
        }
        PatchOperation::Test { path, value } => {
            let current = lookup(root, &parse_pointer(path)?).ok_or_else(|| not_found(path))?;
            if current == value { Ok(()) } else { Err(PatchError::TestFailed(path.clone())) }
        }
    }
}

fn add(root: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    let tokens = parse_pointer(path)?;
    let Some((last, parent)) = tokens.split_last() else {
        *root = value;
        return Ok(());
    };
    match lookup_mut(root, parent) {
        Some(Value::Object(map)) => {
            let key = member_key(map, last).unwrap_or_else(|| last.clone());
            map.insert(key, value);
            Ok(())
        }
        Some(Value::Array(items)) => {
            let index = if last == "-" {
                items.len()
            } else {
                array_index(last).filter(|i| *i <= items.len()).ok_or_else(|| not_found(path))?
            };
            items.insert(index, value);
            Ok(())
        }
        _ => Err(not_found(path)),
    }
}

fn remove(root: &mut Value, path: &str) -> Result<Value, PatchError> {
    let tokens = parse_pointer(path)?;
    let (last, parent) = tokens.split_last().ok_or_else(|| not_found(path))?;
    match lookup_mut(root, parent) {
        Some(Value::Object(map)) => {
            let key = member_key(map, last).ok_or_else(|| not_found(path))?;
            map.remove(&key).ok_or_else(|| not_found(path))
        }
        Some(Value::Array(items)) => {
            let index = array_index(last).filter(|i| *i < items.len()).ok_or_else(|| not_found(path))?;
            Ok(items.remove(index))
        }
        _ => Err(not_found(path)),
    }
}

fn not_found(path: &str) -> PatchError {
    PatchError::PathNotFound(path.to_string())
}

fn parse_pointer(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidPointer(pointer.to_string()));
    };
    rest.split('/')
        .map(|token| {
            if token.replace("~0", "").replace("~1", "").contains('~') {
                Err(PatchError::InvalidPointer(pointer.to_string()))
            } else {
                Ok(token.replace("~1", "/").replace("~0", "~"))
            }
        })
        .collect()
}

/// Exact member name, falling back to an ASCII case-insensitive match.
fn member_key(map: &serde_json::Map<String, Value>, token: &str) -> Option<String> {
    if map.contains_key(token) {
        return Some(token.to_string());
    }
    map.keys().find(|k| k.eq_ignore_ascii_case(token)).cloned()
}

fn array_index(token: &str) -> Option<usize> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if canonical { token.parse().ok() } else { None }
}

fn lookup<'a>(root: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    tokens.iter().try_fold(root, |current, token| match current {
        Value::Object(map) => member_key(map, token).and_then(|k| map.get(&k)),
        Value::Array(items) => array_index(token).and_then(|i| items.get(i)),
        _ => None,
    })
}

fn lookup_mut<'a>(root: &'a mut Value, tokens: &[String]) -> Option<&'a mut Value> {
    tokens.iter().try_fold(root, |current, token| match current {
        Value::Object(map) => {
            let key = member_key(map, token)?;
            map.get_mut(&key)
        }
        Value::Array(items) => array_index(token).and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}
