//! Resolution of simple paths without building tokens.
//!
//! A simple path is a run of plain names joined by the property separator.
//! These loops give the same results as the general resolver for every such
//! path; the property tests hold them to that.

use crate::error::PathError;
use crate::lexer::split_segments;
use crate::value::{Map, Value};

/// Reads a separator-joined path, splitting it directly.
pub fn read_str(root: &Value, path: &str, separator: char) -> Result<Value, PathError> {
    let segments = split_segments(path, separator)?;
    read_segments(root, &segments)
}

/// Writes through a separator-joined path, splitting it directly.
pub fn write_str(
    root: &mut Value,
    path: &str,
    separator: char,
    value: Value,
    force: bool,
) -> Result<(), PathError> {
    let segments = split_segments(path, separator)?;
    write_segments(root, &segments, value, force)
}

/// Descends through precompiled segment names.
pub fn read_segments<S: AsRef<str>>(root: &Value, segments: &[S]) -> Result<Value, PathError> {
    let mut current = root;
    for segment in segments {
        let segment = segment.as_ref();
        current = current
            .child(segment)
            .ok_or_else(|| PathError::NotFound(segment.to_owned()))?;
    }
    Ok(current.clone())
}

/// Assigns `value` at the last segment. With `force`, missing intermediates
/// become empty objects.
pub fn write_segments<S: AsRef<str>>(
    root: &mut Value,
    segments: &[S],
    value: Value,
    force: bool,
) -> Result<(), PathError> {
    let Some((last, intermediate)) = segments.split_last() else {
        return Err(empty_write());
    };

    let mut current = root;
    for segment in intermediate {
        let segment = segment.as_ref();
        if current.child(segment).is_none() {
            if !force {
                return Err(PathError::NotFound(segment.to_owned()));
            }
            current.set_child(segment, Value::Object(Map::new()))?;
        }
        current = current
            .child_mut(segment)
            .ok_or_else(|| PathError::NotFound(segment.to_owned()))?;
    }
    current.set_child(last.as_ref(), value)
}

pub(crate) fn empty_write() -> PathError {
    PathError::AssignmentFailed("an empty path has no assignment target".to_string())
}
