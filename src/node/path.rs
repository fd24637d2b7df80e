//! Dotted-path lookup over node bodies
//!
//! Intermediate arrays fan out: every element is walked and contributes its
//! own slot, so operators evaluate existentially over them.

use serde_json::{Map, Value};

/// Outcome of walking a dotted path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    /// Field present (possibly null)
    Value(&'a Value),
    /// Last segment missing on its parent object
    Absent,
    /// An intermediate level is missing, null, scalar or an empty list
    Unreachable,
}

impl<'a> Slot<'a> {
    /// Present and not null
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Slot::Value(v) if !v.is_null() => Some(v),
            _ => None,
        }
    }
}

/// Every slot reached by `path`, fanning out through intermediate arrays
pub fn lookup<'a>(root: &'a Map<String, Value>, path: &str) -> Vec<Slot<'a>> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut slots = Vec::new();
    walk_object(root, &segments, &mut slots);
    slots
}

/// Single slot reached by `path` without fanning out. Arrays on the way
/// make the path unreachable.
pub fn resolve<'a>(root: &'a Map<String, Value>, path: &str) -> Slot<'a> {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Some(value) = current.get(segment) else {
            return if segments.peek().is_none() {
                Slot::Absent
            } else {
                Slot::Unreachable
            };
        };
        if segments.peek().is_none() {
            return Slot::Value(value);
        }
        match value {
            Value::Object(map) => current = map,
            _ => return Slot::Unreachable,
        }
    }

    Slot::Unreachable
}

fn walk_object<'a>(object: &'a Map<String, Value>, segments: &[&str], slots: &mut Vec<Slot<'a>>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    match object.get(*head) {
        None if rest.is_empty() => slots.push(Slot::Absent),
        None => slots.push(Slot::Unreachable),
        Some(value) if rest.is_empty() => slots.push(Slot::Value(value)),
        Some(value) => walk_value(value, rest, slots),
    }
}

fn walk_value<'a>(value: &'a Value, rest: &[&str], slots: &mut Vec<Slot<'a>>) {
    match value {
        Value::Object(map) => walk_object(map, rest, slots),
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                walk_value(item, rest, slots);
            }
        }
        _ => slots.push(Slot::Unreachable),
    }
}
