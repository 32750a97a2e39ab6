//! Option bag resolution against documented and instance-level defaults.

use indexmap::IndexMap;

use crate::conf::{
    C_OPT_COLLECTION_MODE, C_OPT_COLUMN_AUTOSIZE, C_OPT_COLUMN_MAX_WIDTH, C_OPT_HEADER_ALIGN,
    C_OPT_HEADER_BOLD, C_OPT_HEADER_MERGE_POLICY, C_OPT_HEADER_ROW_COUNT, C_OPT_KEY_SEPARATOR,
    C_OPT_UNLABELLED_KEY, TUP_OPTION_KEYS,
};
use crate::error::{Result, SheetfoldError};
use crate::spec::{EnumHeaderAlign, EnumHeaderMergePolicy, SpecContext};
use crate::value::Value;

/// Caller-supplied options, keyed by option name.
pub type OptionBag = IndexMap<String, Value>;

/// Merge `context` over `defaults` and coerce each option to its declared type.
///
/// Missing and null entries fall back to `defaults`. Unknown keys are ignored.
pub fn normalize_context(context: &OptionBag, defaults: &SpecContext) -> Result<SpecContext> {
    for c_key in context.keys() {
        if !TUP_OPTION_KEYS.contains(&c_key.as_str()) {
            log::debug!("ignoring unknown option {c_key:?}");
        }
    }

    let get = |c_key: &str| context.get(c_key).filter(|val| !matches!(val, Value::Null));

    let collection_mode = match get(C_OPT_COLLECTION_MODE) {
        Some(val) => coerce_bool(C_OPT_COLLECTION_MODE, val)?,
        None => defaults.collection_mode,
    };
    let key_separator = match get(C_OPT_KEY_SEPARATOR) {
        Some(val) => coerce_string(C_OPT_KEY_SEPARATOR, val)?,
        None => defaults.key_separator.clone(),
    };
    let header_bold = match get(C_OPT_HEADER_BOLD) {
        Some(val) => coerce_bool(C_OPT_HEADER_BOLD, val)?,
        None => defaults.header_bold,
    };
    let header_align = match get(C_OPT_HEADER_ALIGN) {
        Some(val) => {
            let c_align = coerce_string(C_OPT_HEADER_ALIGN, val)?;
            EnumHeaderAlign::parse(&c_align).ok_or_else(|| {
                SheetfoldError::invalid_option(
                    C_OPT_HEADER_ALIGN,
                    c_align.clone(),
                    EnumHeaderAlign::C_ALLOWED,
                )
            })?
        }
        None => defaults.header_align,
    };
    let column_autosize = match get(C_OPT_COLUMN_AUTOSIZE) {
        Some(val) => coerce_bool(C_OPT_COLUMN_AUTOSIZE, val)?,
        None => defaults.column_autosize,
    };
    let column_max_width = match get(C_OPT_COLUMN_MAX_WIDTH) {
        Some(val) => coerce_usize(C_OPT_COLUMN_MAX_WIDTH, val)?,
        None => defaults.column_max_width,
    };
    let header_row_count = match get(C_OPT_HEADER_ROW_COUNT) {
        Some(val) => coerce_usize(C_OPT_HEADER_ROW_COUNT, val)?,
        None => defaults.header_row_count,
    };
    let unlabelled_key = match get(C_OPT_UNLABELLED_KEY) {
        Some(val) => coerce_string(C_OPT_UNLABELLED_KEY, val)?,
        None => defaults.unlabelled_key.clone(),
    };
    let header_merge_policy = match get(C_OPT_HEADER_MERGE_POLICY) {
        Some(val) => {
            let c_policy = coerce_string(C_OPT_HEADER_MERGE_POLICY, val)?;
            EnumHeaderMergePolicy::parse(&c_policy).ok_or_else(|| {
                SheetfoldError::invalid_option(
                    C_OPT_HEADER_MERGE_POLICY,
                    c_policy.clone(),
                    EnumHeaderMergePolicy::C_ALLOWED,
                )
            })?
        }
        None => defaults.header_merge_policy,
    };

    Ok(SpecContext {
        collection_mode,
        key_separator,
        header_bold,
        header_align,
        column_autosize,
        column_max_width,
        header_row_count,
        unlabelled_key,
        header_merge_policy,
    })
}

/// Render a resolved context back into an option bag.
pub fn derive_context_bag(context: &SpecContext) -> OptionBag {
    let mut dict_bag = OptionBag::new();
    dict_bag.insert(
        C_OPT_COLLECTION_MODE.to_string(),
        Value::Bool(context.collection_mode),
    );
    dict_bag.insert(
        C_OPT_KEY_SEPARATOR.to_string(),
        Value::String(context.key_separator.clone()),
    );
    dict_bag.insert(C_OPT_HEADER_BOLD.to_string(), Value::Bool(context.header_bold));
    dict_bag.insert(
        C_OPT_HEADER_ALIGN.to_string(),
        Value::from(context.header_align.as_str()),
    );
    dict_bag.insert(
        C_OPT_COLUMN_AUTOSIZE.to_string(),
        Value::Bool(context.column_autosize),
    );
    dict_bag.insert(
        C_OPT_COLUMN_MAX_WIDTH.to_string(),
        Value::Int(cast_usize_to_i64(context.column_max_width)),
    );
    dict_bag.insert(
        C_OPT_HEADER_ROW_COUNT.to_string(),
        Value::Int(cast_usize_to_i64(context.header_row_count)),
    );
    dict_bag.insert(
        C_OPT_UNLABELLED_KEY.to_string(),
        Value::String(context.unlabelled_key.clone()),
    );
    dict_bag.insert(
        C_OPT_HEADER_MERGE_POLICY.to_string(),
        Value::from(context.header_merge_policy.as_str()),
    );
    dict_bag
}

fn cast_usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

////////////////////////////////////////////////////////////////////////////////
// #region Coercion

fn coerce_bool(option: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(val) => Ok(*val),
        Value::Int(val) => Ok(*val != 0),
        Value::Float(val) => Ok(*val != 0.0),
        Value::String(val) => Ok(!(val.is_empty() || val == "0")),
        _ => Err(SheetfoldError::invalid_option(
            option,
            value.kind_name(),
            "a boolean",
        )),
    }
}

fn coerce_string(option: &str, value: &Value) -> Result<String> {
    value
        .as_scalar()
        .map(|val| val.to_text())
        .ok_or_else(|| SheetfoldError::invalid_option(option, value.kind_name(), "a string"))
}

fn coerce_int(option: &str, value: &Value) -> Result<i64> {
    let err = || SheetfoldError::invalid_option(option, describe_value(value), "an integer");
    match value {
        Value::Bool(val) => Ok(i64::from(*val)),
        Value::Int(val) => Ok(*val),
        Value::Float(val) if val.is_finite() => Ok(val.trunc() as i64),
        Value::String(val) => {
            let c_trimmed = val.trim();
            if let Ok(n_val) = c_trimmed.parse::<i64>() {
                return Ok(n_val);
            }
            match c_trimmed.parse::<f64>() {
                Ok(n_val) if n_val.is_finite() => Ok(n_val.trunc() as i64),
                _ => Err(err()),
            }
        }
        _ => Err(err()),
    }
}

fn coerce_usize(option: &str, value: &Value) -> Result<usize> {
    let n_val = coerce_int(option, value)?;
    usize::try_from(n_val).map_err(|_| {
        SheetfoldError::invalid_option(option, n_val.to_string(), "a non-negative integer")
    })
}

fn describe_value(value: &Value) -> String {
    value
        .as_scalar()
        .map(|val| val.to_text())
        .unwrap_or_else(|| value.kind_name().to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::derive_default_context;

    fn bag(entries: &[(&str, Value)]) -> OptionBag {
        entries
            .iter()
            .map(|(c_key, val)| (c_key.to_string(), val.clone()))
            .collect()
    }

    #[test]
    fn test_empty_bag_resolves_to_defaults() {
        let defaults = derive_default_context();
        let context = normalize_context(&OptionBag::new(), &defaults).unwrap();
        assert_eq!(context, defaults);
        assert!(context.collection_mode);
        assert_eq!(context.key_separator, ".");
        assert_eq!(context.header_align, EnumHeaderAlign::Center);
        assert_eq!(context.column_max_width, 50);
        assert_eq!(context.header_row_count, 1);
    }

    #[test]
    fn test_values_are_coerced_to_declared_types() {
        let context = normalize_context(
            &bag(&[
                (C_OPT_COLLECTION_MODE, Value::Int(0)),
                (C_OPT_KEY_SEPARATOR, Value::from("/")),
                (C_OPT_HEADER_BOLD, Value::from("0")),
                (C_OPT_COLUMN_AUTOSIZE, Value::from("yes")),
                (C_OPT_COLUMN_MAX_WIDTH, Value::from("42")),
                (C_OPT_HEADER_ROW_COUNT, Value::Float(2.9)),
                (C_OPT_HEADER_ALIGN, Value::from("left")),
            ]),
            &derive_default_context(),
        )
        .unwrap();

        assert!(!context.collection_mode);
        assert_eq!(context.key_separator, "/");
        assert!(!context.header_bold);
        assert!(context.column_autosize);
        assert_eq!(context.column_max_width, 42);
        assert_eq!(context.header_row_count, 2);
        assert_eq!(context.header_align, EnumHeaderAlign::Left);
    }

    #[test]
    fn test_null_entries_fall_back_to_defaults() {
        let context = normalize_context(
            &bag(&[
                (C_OPT_HEADER_BOLD, Value::Null),
                (C_OPT_HEADER_ROW_COUNT, Value::Null),
                (C_OPT_COLUMN_MAX_WIDTH, Value::Null),
            ]),
            &derive_default_context(),
        )
        .unwrap();
        assert!(context.header_bold);
        assert_eq!(context.header_row_count, 1);
        assert_eq!(context.column_max_width, 50);
    }

    #[test]
    fn test_invalid_alignment_names_option_and_allowed_values() {
        let err = normalize_context(
            &bag(&[(C_OPT_HEADER_ALIGN, Value::from("justify"))]),
            &derive_default_context(),
        )
        .unwrap_err();

        match err {
            SheetfoldError::InvalidOption {
                option,
                value,
                allowed,
            } => {
                assert_eq!(option, C_OPT_HEADER_ALIGN);
                assert_eq!(value, "justify");
                assert_eq!(allowed, EnumHeaderAlign::C_ALLOWED);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_width_is_rejected() {
        let err = normalize_context(
            &bag(&[(C_OPT_COLUMN_MAX_WIDTH, Value::Int(-1))]),
            &derive_default_context(),
        )
        .unwrap_err();
        assert!(matches!(err, SheetfoldError::InvalidOption { option, .. } if option == C_OPT_COLUMN_MAX_WIDTH));
    }

    #[test]
    fn test_structured_option_value_is_rejected() {
        let err = normalize_context(
            &bag(&[(C_OPT_KEY_SEPARATOR, Value::Sequence(vec![]))]),
            &derive_default_context(),
        )
        .unwrap_err();
        assert!(matches!(err, SheetfoldError::InvalidOption { .. }));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let defaults = derive_default_context();
        let first = normalize_context(
            &bag(&[
                (C_OPT_HEADER_BOLD, Value::Int(0)),
                (C_OPT_COLUMN_MAX_WIDTH, Value::Float(12.7)),
                (C_OPT_HEADER_MERGE_POLICY, Value::from("join")),
                (C_OPT_UNLABELLED_KEY, Value::from("_extra")),
            ]),
            &defaults,
        )
        .unwrap();
        let second = normalize_context(&derive_context_bag(&first), &defaults).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_instance_defaults_override_documented_defaults() {
        let instance_defaults = normalize_context(
            &bag(&[(C_OPT_KEY_SEPARATOR, Value::from("__"))]),
            &derive_default_context(),
        )
        .unwrap();
        let context = normalize_context(&OptionBag::new(), &instance_defaults).unwrap();
        assert_eq!(context.key_separator, "__");
    }
}
