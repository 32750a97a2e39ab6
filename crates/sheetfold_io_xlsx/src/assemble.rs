//! Sheet assembly: flattened rows for one sheet -> titled literal grid.

use indexmap::IndexMap;

use crate::error::{Result, SheetfoldError};
use crate::flatten::flatten;
use crate::spec::{EnumCellLiteral, EnumSheetKey, FlatRow, SpecContext, SpecSheetGrid, SpecValuePolicy};
use crate::util::{
    convert_scalar_to_literal, derive_content_widths, plan_column_widths, resolve_sheet_title,
};
use crate::value::Value;

/// Split top-level encode data into `(sheet id, sheet rows)` pairs.
///
/// Records give named sheets (canonical integer keys read as positions),
/// sequences give positional sheets.
pub fn derive_sheet_entries(data: &Value) -> Result<Vec<(EnumSheetKey, &Value)>> {
    match data {
        Value::Record(record) => Ok(record
            .iter()
            .map(|(c_key, val)| (EnumSheetKey::from_record_key(c_key), val))
            .collect()),
        Value::Sequence(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(n_idx, val)| (EnumSheetKey::Index(n_idx), val))
            .collect()),
        other => Err(SheetfoldError::input_shape(format!(
            "Expected data of type iterable, {} given",
            other.kind_name()
        ))),
    }
}

/// Build the grid of one sheet: header row from the first row's keys, then
/// one data row per record.
///
/// Later rows are aligned to the header by key name. Keys missing from the
/// header are appended after it, in first-seen order, under a blank header.
pub fn assemble(
    sheet_key: &EnumSheetKey,
    sheet_idx: usize,
    rows: &Value,
    context: &SpecContext,
    value_policy: &SpecValuePolicy,
) -> Result<SpecSheetGrid> {
    let title = resolve_sheet_title(sheet_key, sheet_idx);
    let l_rows_flat = derive_flat_rows(sheet_idx, rows, &context.key_separator)?;

    let Some(row_first) = l_rows_flat.first() else {
        return Ok(SpecSheetGrid {
            title,
            rows: vec![],
            widths: vec![],
        });
    };

    let mut dict_col_by_key: IndexMap<&str, usize> = row_first
        .keys()
        .enumerate()
        .map(|(n_idx_col, c_key)| (c_key.as_str(), n_idx_col))
        .collect();
    let n_width_header = dict_col_by_key.len();

    let mut l_rows_data: Vec<Vec<EnumCellLiteral>> = Vec::with_capacity(l_rows_flat.len());
    for row_flat in &l_rows_flat {
        let mut l_cells = vec![EnumCellLiteral::Blank; dict_col_by_key.len()];
        for (c_key, val) in row_flat {
            let n_idx_col = match dict_col_by_key.get(c_key.as_str()) {
                Some(n_idx_col) => *n_idx_col,
                None => {
                    let n_idx_col = dict_col_by_key.len();
                    dict_col_by_key.insert(c_key.as_str(), n_idx_col);
                    n_idx_col
                }
            };
            if n_idx_col >= l_cells.len() {
                l_cells.resize(n_idx_col + 1, EnumCellLiteral::Blank);
            }
            l_cells[n_idx_col] = convert_scalar_to_literal(val, value_policy);
        }
        l_rows_data.push(l_cells);
    }

    if dict_col_by_key.len() > n_width_header {
        log::debug!(
            "sheet {title:?}: {} key(s) outside the header row appended as unlabelled columns",
            dict_col_by_key.len() - n_width_header
        );
    }

    let mut l_rows = Vec::with_capacity(l_rows_data.len() + 1);
    l_rows.push(
        row_first
            .keys()
            .map(|c_key| EnumCellLiteral::Text(c_key.clone()))
            .collect(),
    );
    l_rows.extend(l_rows_data);

    let l_widths_content = derive_content_widths(&l_rows, dict_col_by_key.len(), value_policy);
    let widths = plan_column_widths(
        &l_widths_content,
        context.column_autosize,
        context.column_max_width,
    );

    Ok(SpecSheetGrid {
        title,
        rows: l_rows,
        widths,
    })
}

fn derive_flat_rows(sheet_idx: usize, rows: &Value, separator: &str) -> Result<Vec<FlatRow>> {
    let l_rows: Vec<(String, &Value)> = match rows {
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(n_idx, val)| (n_idx.to_string(), val))
            .collect(),
        Value::Record(record) => record.iter().map(|(c_key, val)| (c_key.clone(), val)).collect(),
        other => {
            return Err(SheetfoldError::input_shape(format!(
                "Expected rows of type \"iterable\" for data sheet #{sheet_idx}, \"{}\" given",
                other.kind_name()
            )));
        }
    };

    l_rows
        .into_iter()
        .map(|(c_row_idx, row)| match row {
            Value::Record(_) | Value::Sequence(_) | Value::Object(_) => flatten(row, separator),
            other => Err(SheetfoldError::input_shape(format!(
                "Expected cells of type \"iterable\" for data sheet #{sheet_idx} at row #{c_row_idx}, \"{}\" given",
                other.kind_name()
            ))),
        })
        .collect()
}
