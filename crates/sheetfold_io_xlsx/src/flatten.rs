//! Depth-first linearization of nested records into dotted-path rows.

use std::borrow::Cow;

use crate::error::{Result, SheetfoldError};
use crate::spec::FlatRow;
use crate::value::{ExposeFields, Scalar, Value};

type Entries<'a> = Vec<(String, Cow<'a, Value>)>;

/// Pending children of one structure, with the key prefix they inherit.
struct Frame<'a> {
    prefix: String,
    entries: std::vec::IntoIter<(String, Cow<'a, Value>)>,
}

/// Flatten one record into `separator`-joined paths.
///
/// Traversal is pre-order in iteration order; a path produced twice keeps its
/// first position and the last value.
pub fn flatten(record: &Value, separator: &str) -> Result<FlatRow> {
    let mut row_flat = FlatRow::new();
    flatten_into(record, separator, &mut row_flat)?;
    Ok(row_flat)
}

/// Same as [`flatten`], accumulating into an existing row.
pub fn flatten_into(record: &Value, separator: &str, out: &mut FlatRow) -> Result<()> {
    let Some(l_entries_root) = derive_entries(Cow::Borrowed(record)) else {
        return Err(SheetfoldError::input_shape(format!(
            "Expected cells of type \"iterable\", \"{}\" given",
            record.kind_name()
        )));
    };

    let mut l_stack = vec![Frame {
        prefix: String::new(),
        entries: l_entries_root.into_iter(),
    }];

    while let Some(frame) = l_stack.last_mut() {
        let Some((c_key, value)) = frame.entries.next() else {
            l_stack.pop();
            continue;
        };
        let c_path = format!("{}{}", frame.prefix, c_key);

        if let Value::Opaque(c_kind) = value.as_ref() {
            return Err(SheetfoldError::NonScalarLeaf {
                key: c_path,
                kind: c_kind.clone(),
            });
        }

        if let Some(scalar) = value.as_scalar() {
            out.insert(c_path, canonicalize_scalar(scalar));
            continue;
        }

        if let Some(l_entries) = derive_entries(value) {
            l_stack.push(Frame {
                prefix: format!("{c_path}{separator}"),
                entries: l_entries.into_iter(),
            });
        }
    }

    Ok(())
}

/// `false -> 0`, `true -> 1`; everything else unchanged.
pub fn canonicalize_scalar(scalar: Scalar) -> Scalar {
    match scalar {
        Scalar::Bool(val) => Scalar::Int(i64::from(val)),
        other => other,
    }
}

/// Children of a record-like value; objects are coerced through their fields.
fn derive_entries(value: Cow<'_, Value>) -> Option<Entries<'_>> {
    match value {
        Cow::Borrowed(Value::Record(record)) => Some(
            record
                .iter()
                .map(|(c_key, val)| (c_key.clone(), Cow::Borrowed(val)))
                .collect(),
        ),
        Cow::Borrowed(Value::Sequence(items)) => Some(
            items
                .iter()
                .enumerate()
                .map(|(n_idx, val)| (n_idx.to_string(), Cow::Borrowed(val)))
                .collect(),
        ),
        Cow::Owned(Value::Record(record)) => Some(
            record
                .into_iter()
                .map(|(c_key, val)| (c_key, Cow::Owned(val)))
                .collect(),
        ),
        Cow::Owned(Value::Sequence(items)) => Some(
            items
                .into_iter()
                .enumerate()
                .map(|(n_idx, val)| (n_idx.to_string(), Cow::Owned(val)))
                .collect(),
        ),
        Cow::Borrowed(Value::Object(obj)) => Some(derive_object_entries(&**obj)),
        Cow::Owned(Value::Object(obj)) => Some(derive_object_entries(&*obj)),
        _ => None,
    }
}

fn derive_object_entries<'a>(obj: &dyn ExposeFields) -> Entries<'a> {
    obj.expose_fields()
        .into_iter()
        .map(|(c_key, val)| (c_key, Cow::Owned(val)))
        .collect()
}
