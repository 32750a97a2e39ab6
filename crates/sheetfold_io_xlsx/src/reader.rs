//! Workbook reader: payload bytes -> ordered raw grids per sheet.

use std::fs::File;
use std::io::{BufReader, Write};

use calamine::{Data, Range, Reader, Xls, Xlsx, open_workbook};
use indexmap::IndexMap;

use crate::conf::{
    C_TMP_FILE_PREFIX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_MAGIC_OLE, TUP_MAGIC_ZIP,
};
use crate::error::{Result, SheetfoldError};
use crate::spec::{EnumContainerFormat, Grid};
use crate::value::Scalar;

/// Resolve `Auto` to a concrete container from the payload signature.
pub fn detect_container_format(
    payload: &[u8],
    format: EnumContainerFormat,
) -> Result<EnumContainerFormat> {
    match format {
        EnumContainerFormat::Auto => {
            if payload.starts_with(&TUP_MAGIC_OLE) {
                Ok(EnumContainerFormat::Xls)
            } else if payload.starts_with(&TUP_MAGIC_ZIP) {
                Ok(EnumContainerFormat::Xlsx)
            } else {
                Err(SheetfoldError::sheet_read_msg(
                    "unable to detect the container format of the payload",
                ))
            }
        }
        other => Ok(other),
    }
}

/// Read every sheet of the payload, in workbook order.
///
/// Each grid is anchored at `A1`: leading empty rows and columns come back as
/// null cells. Modern workbooks are also padded to their declared dimension,
/// so trailing rows of blank cells are kept.
pub fn read_grids(payload: &[u8], format: EnumContainerFormat) -> Result<IndexMap<String, Grid>> {
    let format = detect_container_format(payload, format)?;

    let mut file_tmp = tempfile::Builder::new()
        .prefix(C_TMP_FILE_PREFIX)
        .suffix(&format!(".{}", format.as_str()))
        .tempfile()
        .map_err(|err| SheetfoldError::sheet_read("cannot create temporary file", err))?;
    file_tmp
        .write_all(payload)
        .and_then(|_| file_tmp.flush())
        .map_err(|err| SheetfoldError::sheet_read("cannot stage payload", err))?;

    match format {
        EnumContainerFormat::Xls => {
            let mut workbook: Xls<BufReader<File>> = open_workbook(file_tmp.path())
                .map_err(|err| SheetfoldError::sheet_read(format!("{err}"), err))?;
            read_workbook_grids(&mut workbook)
        }
        _ => {
            let mut workbook: Xlsx<BufReader<File>> = open_workbook(file_tmp.path())
                .map_err(|err| SheetfoldError::sheet_read(format!("{err}"), err))?;
            let mut dict_grids = read_workbook_grids(&mut workbook)?;
            for (sheet_name, grid) in dict_grids.iter_mut() {
                // an empty sheet still declares `A1`
                if grid.is_empty() {
                    continue;
                }
                let dimensions = workbook
                    .worksheet_cells_reader(sheet_name)
                    .map_err(|err| {
                        SheetfoldError::sheet_read(
                            format!("cannot read dimension of sheet {sheet_name:?}: {err}"),
                            err,
                        )
                    })?
                    .dimensions();
                pad_grid(
                    grid,
                    dimensions.end.0 as usize + 1,
                    dimensions.end.1 as usize + 1,
                );
            }
            Ok(dict_grids)
        }
    }
}

fn read_workbook_grids<R>(workbook: &mut R) -> Result<IndexMap<String, Grid>>
where
    R: Reader<BufReader<File>>,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    let mut dict_grids = IndexMap::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|err| {
            SheetfoldError::sheet_read(format!("cannot read sheet {sheet_name:?}: {err}"), err)
        })?;
        dict_grids.insert(sheet_name, derive_grid_from_range(&range));
    }
    Ok(dict_grids)
}

/// Copy a calamine range into a grid anchored at `A1`.
pub fn derive_grid_from_range(range: &Range<Data>) -> Grid {
    let Some((n_row_start, n_col_start)) = range.start() else {
        return Grid::new();
    };
    let n_row_start = n_row_start as usize;
    let n_col_start = n_col_start as usize;
    let n_width = n_col_start + range.width();

    let mut grid: Grid = Vec::with_capacity(n_row_start + range.height());
    grid.extend((0..n_row_start).map(|_| vec![Scalar::Null; n_width]));
    for row in range.rows() {
        let mut l_cells = Vec::with_capacity(n_width);
        l_cells.resize(n_col_start, Scalar::Null);
        l_cells.extend(row.iter().map(convert_cell));
        grid.push(l_cells);
    }
    grid
}

/// Grow a grid with null cells to at least `n_rows` x `n_cols`.
///
/// Targets are clamped to the container limits; a grid is never shrunk.
pub fn pad_grid(grid: &mut Grid, n_rows: usize, n_cols: usize) {
    let n_rows = n_rows.min(N_NROWS_EXCEL_MAX);
    let n_cols = grid
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(n_cols.min(N_NCOLS_EXCEL_MAX));
    for row in grid.iter_mut() {
        row.resize(n_cols, Scalar::Null);
    }
    while grid.len() < n_rows {
        grid.push(vec![Scalar::Null; n_cols]);
    }
}

/// Map one stored cell to a scalar.
///
/// The container stores every number as a double, so integral values within
/// the `i64` range are returned as integers.
pub fn convert_cell(value: &Data) -> Scalar {
    match value {
        Data::Empty => Scalar::Null,
        Data::Bool(val) => Scalar::Bool(*val),
        Data::Int(val) => Scalar::Int(*val),
        Data::Float(val) => convert_float(*val),
        Data::String(val) => Scalar::String(val.clone()),
        Data::DateTime(val) => Scalar::Float(val.as_f64()),
        Data::DateTimeIso(val) | Data::DurationIso(val) => Scalar::String(val.clone()),
        Data::Error(err) => Scalar::String(err.to_string()),
    }
}

fn convert_float(value: f64) -> Scalar {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Scalar::Int(value as i64)
    } else {
        Scalar::Float(value)
    }
}
