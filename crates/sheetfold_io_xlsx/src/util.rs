//! Stateless helper utilities shared by the assembler and the writer.

use crate::conf::{
    C_SHEET_TITLE_POSITIONAL_PREFIX, N_INT_EXACT_F64_MAX, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_WIDTH_CELL_PADDING, N_WIDTH_EXCEL_COLUMN_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::error::{Result, SheetfoldError};
use crate::spec::{EnumCellLiteral, EnumSheetKey, SpecColumnWidth, SpecValuePolicy};
use crate::value::Scalar;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy string; `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64, value_policy: &SpecValuePolicy) -> Option<String> {
    if x.is_nan() {
        return Some(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    None
}

/// Wrap a flattened scalar as a forced literal for the writer.
///
/// Cells hold doubles, so integers beyond `2^53` in magnitude are written as
/// their decimal text. The container cannot store an empty string; `""`
/// becomes a blank cell.
pub fn convert_scalar_to_literal(value: &Scalar, value_policy: &SpecValuePolicy) -> EnumCellLiteral {
    match value {
        Scalar::Null => EnumCellLiteral::Blank,
        Scalar::Bool(val) => EnumCellLiteral::Boolean(*val),
        Scalar::Int(val) if val.unsigned_abs() > N_INT_EXACT_F64_MAX => {
            EnumCellLiteral::Text(val.to_string())
        }
        Scalar::Int(val) => EnumCellLiteral::Number(*val as f64),
        Scalar::Float(val) => match convert_nan_inf_to_str(*val, value_policy) {
            Some(c_text) => EnumCellLiteral::Text(c_text),
            None => EnumCellLiteral::Number(*val),
        },
        Scalar::String(val) if val.is_empty() => EnumCellLiteral::Blank,
        Scalar::String(val) => EnumCellLiteral::Text(val.clone()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Title for the sheet at `sheet_idx`: positional ids become `Sheet_<idx>`.
pub fn resolve_sheet_title(sheet_key: &EnumSheetKey, sheet_idx: usize) -> String {
    match sheet_key {
        EnumSheetKey::Index(n_idx) if *n_idx == sheet_idx => {
            format!("{C_SHEET_TITLE_POSITIONAL_PREFIX}{sheet_idx}")
        }
        EnumSheetKey::Index(n_idx) => n_idx.to_string(),
        EnumSheetKey::Name(c_name) => c_name.clone(),
    }
}

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let c_name: String = c_name.trim().chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    // leading or trailing apostrophes are rejected by Excel
    let c_name = c_name.trim_matches('\'').trim();
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.to_string()
}

/// Fail before writing when a grid cannot fit into one worksheet.
pub fn validate_grid_limits(title: &str, height: usize, width: usize) -> Result<()> {
    if height > N_NROWS_EXCEL_MAX {
        return Err(SheetfoldError::sheet_write_msg(format!(
            "Sheet {title:?} has {height} rows; Excel limit is {N_NROWS_EXCEL_MAX}."
        )));
    }
    if width > N_NCOLS_EXCEL_MAX {
        return Err(SheetfoldError::sheet_write_msg(format!(
            "Sheet {title:?} has {width} columns; Excel limit is {N_NCOLS_EXCEL_MAX}."
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Estimate displayed width units for one literal.
pub fn estimate_width_len(value: &EnumCellLiteral, value_policy: &SpecValuePolicy) -> usize {
    match value {
        EnumCellLiteral::Blank => 0,
        EnumCellLiteral::Text(s) => estimate_unicode_string_width(s),
        EnumCellLiteral::Boolean(_) => 5,
        EnumCellLiteral::Number(n) => match convert_nan_inf_to_str(*n, value_policy) {
            Some(c_text) => c_text.len(),
            None => n.to_string().len(),
        },
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Content widths per column over all rows, header included.
pub fn derive_content_widths(
    rows: &[Vec<EnumCellLiteral>],
    width_grid: usize,
    value_policy: &SpecValuePolicy,
) -> Vec<usize> {
    let mut l_width_by_col = vec![0usize; width_grid];
    for row in rows {
        for (n_idx_col, value) in row.iter().enumerate() {
            l_width_by_col[n_idx_col] = usize::max(
                l_width_by_col[n_idx_col],
                estimate_width_len(value, value_policy),
            );
        }
    }
    l_width_by_col
}

/// Autosize every column, then clamp columns wider than `width_max`.
///
/// Clamped columns get exactly `width_max` and lose their autosize flag.
/// Returns no plan when autosize is off.
pub fn plan_column_widths(
    content_widths: &[usize],
    if_autosize: bool,
    width_max: usize,
) -> Vec<SpecColumnWidth> {
    if !if_autosize {
        return vec![];
    }

    content_widths
        .iter()
        .map(|n_width_content| {
            let n_width_auto = usize::min(
                N_WIDTH_EXCEL_COLUMN_MAX,
                n_width_content + N_WIDTH_CELL_PADDING,
            );
            if n_width_auto > width_max {
                SpecColumnWidth {
                    width: width_max,
                    if_autosize: false,
                }
            } else {
                SpecColumnWidth {
                    width: n_width_auto,
                    if_autosize: true,
                }
            }
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
