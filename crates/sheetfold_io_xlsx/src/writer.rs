//! XLSX writer kernel that turns assembled literal grids into workbook bytes.

use std::collections::BTreeSet;

use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};

use crate::conf::{C_TMP_FILE_PREFIX, N_LEN_EXCEL_SHEET_NAME_MAX};
use crate::error::{Result, SheetfoldError};
use crate::spec::{
    EnumCellLiteral, EnumHeaderAlign, SpecCellFormat, SpecEncodeReport, SpecSheetGrid,
    SpecSheetReport,
};
use crate::util::{sanitize_sheet_name, validate_grid_limits};

/// Stateful workbook writer.
///
/// Sheets are buffered in memory; [`Self::finish`] stages the workbook in a
/// temporary file and returns its bytes.
pub struct XlsxSheetWriter {
    workbook: Workbook,
    fmt_header: Format,
    fmt_blank: Format,
    set_sheet_names_existing: BTreeSet<String>,
    report: SpecEncodeReport,
}

impl XlsxSheetWriter {
    pub fn new(fmt_header: &SpecCellFormat) -> Self {
        Self {
            workbook: Workbook::new(),
            fmt_header: derive_rust_xlsx_format(fmt_header),
            fmt_blank: derive_blank_format(),
            set_sheet_names_existing: BTreeSet::new(),
            report: SpecEncodeReport::default(),
        }
    }

    /// Snapshot of what has been written so far.
    pub fn report(&self) -> &SpecEncodeReport {
        &self.report
    }

    /// Add one worksheet. The first grid row is the header row.
    pub fn write_sheet(&mut self, grid: &SpecSheetGrid) -> Result<()> {
        let n_height = grid.rows.len();
        let n_width = grid.width();
        validate_grid_limits(&grid.title, n_height, n_width)?;

        let sheet_name_sanitized = sanitize_sheet_name(&grid.title, "_");
        if sheet_name_sanitized != grid.title {
            self.report.warn(format!(
                "Sheet title {:?} is not valid for the container; written as {:?}.",
                grid.title, sheet_name_sanitized
            ));
        }
        let sheet_name_unique = self.derive_unique_sheet_name(&sheet_name_sanitized);
        if sheet_name_unique != sheet_name_sanitized {
            self.report.warn(format!(
                "Sheet title {sheet_name_sanitized:?} already used; written as {sheet_name_unique:?}."
            ));
        }
        log::debug!("writing sheet {sheet_name_unique:?} ({n_height} x {n_width})");

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name_unique)
            .map_err(|err| derive_xlsx_error(&format!("invalid sheet name {sheet_name_unique:?}"), err))?;

        let mut l_rows = grid.rows.iter();
        if let Some(row_header) = l_rows.next() {
            write_header(worksheet, row_header, &self.fmt_header)?;
        }
        for (n_idx_row, row) in l_rows.enumerate() {
            for (n_idx_col, value) in row.iter().enumerate() {
                write_cell(worksheet, n_idx_row + 1, n_idx_col, value, &self.fmt_blank)?;
            }
        }

        let mut l_cols_clamped = Vec::new();
        for (n_idx_col, width) in grid.widths.iter().enumerate() {
            if !width.if_autosize {
                l_cols_clamped.push(n_idx_col);
            }
            worksheet
                .set_column_width(cast_col_num(n_idx_col)?, width.width as f64)
                .map_err(|err| derive_xlsx_error("cannot set column width", err))?;
        }
        if !l_cols_clamped.is_empty() {
            self.report.warn(format!(
                "Sheet {sheet_name_unique:?}: column(s) {l_cols_clamped:?} clamped to the maximum width."
            ));
        }

        self.report.sheets.push(SpecSheetReport {
            title_requested: grid.title.clone(),
            title: sheet_name_unique,
            n_rows: n_height,
            n_cols: n_width,
        });
        Ok(())
    }

    /// Save the workbook through a per-call temporary file and return its bytes.
    ///
    /// The temporary file is removed on every path out of this function.
    pub fn finish(mut self) -> Result<(Vec<u8>, SpecEncodeReport)> {
        let file_tmp = tempfile::Builder::new()
            .prefix(C_TMP_FILE_PREFIX)
            .suffix(".xlsx")
            .tempfile()
            .map_err(|err| SheetfoldError::sheet_write("cannot create temporary file", err))?;

        self.workbook
            .save(file_tmp.path())
            .map_err(|err| derive_xlsx_error("cannot save workbook", err))?;
        let v_payload = std::fs::read(file_tmp.path())
            .map_err(|err| SheetfoldError::sheet_write("cannot read back workbook", err))?;

        Ok((v_payload, self.report))
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        // Excel compares sheet names case-insensitively.
        let c_name_key = name.to_lowercase();
        if !self.set_sheet_names_existing.contains(&c_name_key) {
            self.set_sheet_names_existing.insert(c_name_key);
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            let c_candidate_key = candidate.to_lowercase();
            if !self.set_sheet_names_existing.contains(&c_candidate_key) {
                self.set_sheet_names_existing.insert(c_candidate_key);
                return candidate;
            }
            n_idx += 1;
        }
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    row_header: &[EnumCellLiteral],
    fmt_header: &Format,
) -> Result<()> {
    for (n_idx_col, value) in row_header.iter().enumerate() {
        let n_col = cast_col_num(n_idx_col)?;
        match value {
            EnumCellLiteral::Text(val) if !val.is_empty() => {
                worksheet
                    .write_string_with_format(0, n_col, val, fmt_header)
                    .map_err(|err| derive_xlsx_error("cannot write header", err))?;
            }
            _ => {
                worksheet
                    .write_blank(0, n_col, fmt_header)
                    .map_err(|err| derive_xlsx_error("cannot write header", err))?;
            }
        }
    }
    Ok(())
}

/// Write one literal as a typed cell; strings are never read as formulas.
///
/// Blanks are written as formatted blank cells so that the sheet dimension
/// still covers rows made only of nulls.
fn write_cell(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellLiteral,
    fmt_blank: &Format,
) -> Result<()> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    let result = match value {
        EnumCellLiteral::Blank => worksheet.write_blank(n_row, n_col, fmt_blank).map(|_| ()),
        EnumCellLiteral::Text(val) => worksheet.write_string(n_row, n_col, val).map(|_| ()),
        EnumCellLiteral::Number(val) => worksheet.write_number(n_row, n_col, *val).map(|_| ()),
        EnumCellLiteral::Boolean(val) => worksheet.write_boolean(n_row, n_col, *val).map(|_| ()),
    };
    result.map_err(|err| derive_xlsx_error(&format!("cannot write cell ({row_idx}, {col_idx})"), err))
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(align) = spec.align {
        format = format.set_align(derive_format_align(align));
    }
    format
}

/// Blank cells carry a text number format; a default format would be dropped.
fn derive_blank_format() -> Format {
    Format::new().set_num_format("@")
}

fn derive_format_align(align: EnumHeaderAlign) -> FormatAlign {
    match align {
        EnumHeaderAlign::Left => FormatAlign::Left,
        EnumHeaderAlign::Center => FormatAlign::Center,
        EnumHeaderAlign::Right => FormatAlign::Right,
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| SheetfoldError::sheet_write_msg(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| SheetfoldError::sheet_write_msg(format!("column index overflow: {value}")))
}

fn derive_xlsx_error(message: &str, err: XlsxError) -> SheetfoldError {
    SheetfoldError::sheet_write(format!("{message}: {err}"), err)
}
