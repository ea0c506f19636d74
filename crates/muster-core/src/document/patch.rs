//! Declarative field-level patches
//!
//! A [`DocumentPatch`] is an ordered list of operations on individual fields.
//! Fields a patch does not mention are never touched, and a deletion is an
//! explicit [`FieldOp::Delete`] rather than the absence of a field. Stores apply a
//! whole patch atomically per document.

use serde_json::{Map, Value};

use super::path::FieldPath;

/// One operation on one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Overwrite the field, creating intermediate objects
    Set(Value),
    /// Like `Set`, but only when the document is being created by this patch
    SetOnInsert(Value),
    /// Add to an integer field; a missing field counts as zero
    Increment(i64),
    /// Push onto an array field; a missing field becomes a one-element array
    Append(Value),
    /// Remove the field; removing a missing field is a no-op
    Delete,
}

/// Errors raised while applying a patch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("cannot patch the document root")]
    EmptyPath,

    #[error("field {0} is not an object")]
    NotAnObject(String),

    #[error("field {0} is not an integer")]
    NotAnInteger(String),

    #[error("field {0} is not an array")]
    NotAnArray(String),
}

/// Ordered set of field operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    ops: Vec<(FieldPath, FieldOp)>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<FieldPath>, value: Value) -> Self {
        self.ops.push((path.into(), FieldOp::Set(value)));
        self
    }

    pub fn set_on_insert(mut self, path: impl Into<FieldPath>, value: Value) -> Self {
        self.ops.push((path.into(), FieldOp::SetOnInsert(value)));
        self
    }

    pub fn increment(mut self, path: impl Into<FieldPath>, delta: i64) -> Self {
        self.ops.push((path.into(), FieldOp::Increment(delta)));
        self
    }

    pub fn append(mut self, path: impl Into<FieldPath>, value: Value) -> Self {
        self.ops.push((path.into(), FieldOp::Append(value)));
        self
    }

    pub fn delete(mut self, path: impl Into<FieldPath>) -> Self {
        self.ops.push((path.into(), FieldOp::Delete));
        self
    }

    /// Append every operation of `other` after this patch's operations
    pub fn merge(mut self, other: DocumentPatch) -> Self {
        self.ops.extend(other.ops);
        self
    }

    pub fn ops(&self) -> &[(FieldPath, FieldOp)] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Apply the patch to a copy of `document`
    ///
    /// `inserted` tells whether the document is being created by this patch, which
    /// decides whether `SetOnInsert` operations take effect. On error the input is
    /// left as it was, so callers can treat a patch as all-or-nothing.
    pub fn apply(&self, document: &Value, inserted: bool) -> Result<Value, PatchError> {
        let mut result = match document {
            Value::Object(_) => document.clone(),
            _ => Value::Object(Map::new()),
        };

        for (path, op) in &self.ops {
            apply_op(&mut result, path, op, inserted)?;
        }

        Ok(result)
    }
}

fn apply_op(document: &mut Value, path: &FieldPath, op: &FieldOp, inserted: bool) -> Result<(), PatchError> {
    let (key, _) = path.split_last().ok_or(PatchError::EmptyPath)?;

    match op {
        FieldOp::Set(value) => {
            let parent = parent_for_write(document, path)?;
            parent.insert(key.clone(), value.clone());
        }
        FieldOp::SetOnInsert(value) => {
            if inserted {
                let parent = parent_for_write(document, path)?;
                parent.insert(key.clone(), value.clone());
            }
        }
        FieldOp::Increment(delta) => {
            let parent = parent_for_write(document, path)?;
            let current = match parent.get(key) {
                None | Some(Value::Null) => 0,
                Some(value) => value
                    .as_i64()
                    .ok_or_else(|| PatchError::NotAnInteger(path.to_string()))?,
            };
            parent.insert(key.clone(), Value::from(current.saturating_add(*delta)));
        }
        FieldOp::Append(value) => {
            let parent = parent_for_write(document, path)?;
            match parent.get_mut(key) {
                None | Some(Value::Null) => {
                    parent.insert(key.clone(), Value::Array(vec![value.clone()]));
                }
                Some(Value::Array(items)) => items.push(value.clone()),
                Some(_) => return Err(PatchError::NotAnArray(path.to_string())),
            }
        }
        FieldOp::Delete => {
            if let Some(parent) = parent_for_delete(document, path) {
                parent.remove(key);
            }
        }
    }

    Ok(())
}

/// Walk to the parent object of `path`, creating missing (or null) objects on the way
fn parent_for_write<'a>(document: &'a mut Value, path: &FieldPath) -> Result<&'a mut Map<String, Value>, PatchError> {
    let (_, parents) = path.split_last().ok_or(PatchError::EmptyPath)?;
    let mut current = document;

    for (depth, segment) in parents.iter().enumerate() {
        let Value::Object(map) = current else {
            return Err(PatchError::NotAnObject(
                FieldPath::from_segments(&parents[..depth]).to_string(),
            ));
        };
        let next = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if next.is_null() {
            *next = Value::Object(Map::new());
        }
        current = next;
    }

    match current {
        Value::Object(map) => Ok(map),
        _ => Err(PatchError::NotAnObject(
            FieldPath::from_segments(parents.iter().cloned()).to_string(),
        )),
    }
}

/// Walk to the parent object of `path` without creating anything
fn parent_for_delete<'a>(document: &'a mut Value, path: &FieldPath) -> Option<&'a mut Map<String, Value>> {
    let (_, parents) = path.split_last()?;
    let mut current = document;

    for segment in parents {
        current = current.as_object_mut()?.get_mut(segment)?;
    }

    current.as_object_mut()
}
