//! JSON-Patch style partial updates.
//!
//! Paths are JSON pointers (`/spec/replicas`). `add` and `replace` create
//! missing intermediate objects so a field like `/spec/rollout/pause` can be
//! set on a resource that has no `rollout` section yet. `remove` requires the
//! target to exist.
//!
//! A patch list is applied to a copy of the document: either every
//! operation succeeds and the new document is returned, or the original is
//! left as it was.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// Fixed replica count of a service.
pub const REPLICAS_PATH: &str = "/spec/replicas";

/// Declared traffic weight of a service.
pub const WEIGHT_PATH: &str = "/spec/weight";

/// Rollout pause flag of a service.
pub const ROLLOUT_PAUSE_PATH: &str = "/spec/rollout/pause";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Add,
    Remove,
    Replace,
}

/// A single patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: PatchKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOp {
    pub fn replace(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchKind::Replace,
            path: path.to_string(),
            value: Some(value.into()),
        }
    }

    pub fn add(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchKind::Add,
            path: path.to_string(),
            value: Some(value.into()),
        }
    }

    pub fn remove(path: &str) -> Self {
        Self {
            op: PatchKind::Remove,
            path: path.to_string(),
            value: None,
        }
    }
}

/// Apply `ops` to a copy of `doc` and return the patched copy.
pub fn apply_patch(doc: &Value, ops: &[PatchOp]) -> StoreResult<Value> {
    let mut out = doc.clone();
    for op in ops {
        apply_one(&mut out, op)?;
    }
    Ok(out)
}

fn apply_one(doc: &mut Value, op: &PatchOp) -> StoreResult<()> {
    let tokens = parse_pointer(&op.path)?;

    let Some((last, parents)) = tokens.split_last() else {
        // Empty pointer addresses the whole document.
        return match op.op {
            PatchKind::Remove => Err(StoreError::Rejected(
                "cannot remove the document root".to_string(),
            )),
            PatchKind::Add | PatchKind::Replace => {
                *doc = required_value(op)?;
                Ok(())
            }
        };
    };

    let create = op.op != PatchKind::Remove;
    let mut target = doc;
    for token in parents {
        target = child_mut(target, token, create, &op.path)?;
    }

    match op.op {
        PatchKind::Add => set_member(target, last, required_value(op)?, true, &op.path),
        PatchKind::Replace => set_member(target, last, required_value(op)?, false, &op.path),
        PatchKind::Remove => remove_member(target, last, &op.path),
    }
}

fn parse_pointer(path: &str) -> StoreResult<Vec<String>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
    Ok(rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect())
}

fn required_value(op: &PatchOp) -> StoreResult<Value> {
    op.value.clone().ok_or_else(|| {
        StoreError::Rejected(format!("{:?} at {} requires a value", op.op, op.path))
    })
}

fn array_index(token: &str, path: &str) -> StoreResult<usize> {
    token
        .parse::<usize>()
        .map_err(|_| StoreError::InvalidPath(path.to_string()))
}

fn child_mut<'a>(
    node: &'a mut Value,
    token: &str,
    create: bool,
    path: &str,
) -> StoreResult<&'a mut Value> {
    if create && node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            if create {
                Ok(map
                    .entry(token.to_string())
                    .or_insert_with(|| Value::Object(Map::new())))
            } else {
                map.get_mut(token)
                    .ok_or_else(|| StoreError::InvalidPath(path.to_string()))
            }
        }
        Value::Array(items) => {
            let idx = array_index(token, path)?;
            items
                .get_mut(idx)
                .ok_or_else(|| StoreError::InvalidPath(path.to_string()))
        }
        _ => Err(StoreError::InvalidPath(path.to_string())),
    }
}

fn set_member(
    node: &mut Value,
    token: &str,
    value: Value,
    insert: bool,
    path: &str,
) -> StoreResult<()> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            map.insert(token.to_string(), value);
            Ok(())
        }
        Value::Array(items) if insert => {
            if token == "-" {
                items.push(value);
                return Ok(());
            }
            let idx = array_index(token, path)?;
            if idx > items.len() {
                return Err(StoreError::InvalidPath(path.to_string()));
            }
            items.insert(idx, value);
            Ok(())
        }
        Value::Array(items) => {
            let idx = array_index(token, path)?;
            let slot = items
                .get_mut(idx)
                .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
            *slot = value;
            Ok(())
        }
        _ => Err(StoreError::InvalidPath(path.to_string())),
    }
}

fn remove_member(node: &mut Value, token: &str, path: &str) -> StoreResult<()> {
    match node {
        Value::Object(map) => map
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| StoreError::InvalidPath(path.to_string())),
        Value::Array(items) => {
            let idx = array_index(token, path)?;
            if idx >= items.len() {
                return Err(StoreError::InvalidPath(path.to_string()));
            }
            items.remove(idx);
            Ok(())
        }
        _ => Err(StoreError::InvalidPath(path.to_string())),
    }
}
