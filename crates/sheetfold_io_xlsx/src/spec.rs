//! Shared specification models: options, grids, labelled rows and reports.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::{Result, SheetfoldError};
use crate::value::Scalar;

/// Raw reader-facing grid, header rows included.
pub type Grid = Vec<Vec<Scalar>>;

/// Flattened record: dotted path -> scalar, in traversal order.
pub type FlatRow = IndexMap<String, Scalar>;

////////////////////////////////////////////////////////////////////////////////
// #region ContainerFormat

/// Spreadsheet container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumContainerFormat {
    /// Legacy BIFF8 workbook (`.xls`).
    Xls,
    /// Office Open XML workbook (`.xlsx`).
    Xlsx,
    /// Sniff the container from the payload (decode only).
    Auto,
}

impl EnumContainerFormat {
    /// Parse a caller-supplied format string.
    pub fn parse(format: &str) -> Result<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "xls" => Ok(Self::Xls),
            "xlsx" => Ok(Self::Xlsx),
            "auto" | "" => Ok(Self::Auto),
            _ => Err(SheetfoldError::unsupported_format(format)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Auto => "auto",
        }
    }
}

/// Caller-side sheet id: position in a sequence, or record key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSheetKey {
    Index(usize),
    Name(String),
}

impl EnumSheetKey {
    /// Canonical non-negative integer keys (`"0"`, `"12"`) read as indexes.
    pub fn from_record_key(key: &str) -> Self {
        match key.parse::<usize>() {
            Ok(n_idx) if n_idx.to_string() == key => Self::Index(n_idx),
            _ => Self::Name(key.to_string()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Context

/// Horizontal alignment of header cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumHeaderAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl EnumHeaderAlign {
    pub const C_ALLOWED: &'static str = "\"left\", \"center\" or \"right\"";

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Combination rule for labels coming from several header rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumHeaderMergePolicy {
    /// A later non-empty header cell replaces the column label.
    #[default]
    LastWins,
    /// Non-empty header cells are joined with the key separator.
    Join,
}

impl EnumHeaderMergePolicy {
    pub const C_ALLOWED: &'static str = "\"last\" or \"join\"";

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "last" => Some(Self::LastWins),
            "join" => Some(Self::Join),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastWins => "last",
            Self::Join => "join",
        }
    }
}

/// Fully resolved encode/decode context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecContext {
    /// Labelled rows (`true`) or raw grids (`false`) on decode.
    pub collection_mode: bool,
    /// Separator between nested key segments.
    pub key_separator: String,
    /// Bold header cells.
    pub header_bold: bool,
    /// Header cell alignment.
    pub header_align: EnumHeaderAlign,
    /// Estimate column widths from content.
    pub column_autosize: bool,
    /// Clamp for estimated column widths.
    pub column_max_width: usize,
    /// Leading header rows on decode; `0` returns raw grids.
    pub header_row_count: usize,
    /// Bucket key for unlabelled columns on decode.
    pub unlabelled_key: String,
    /// Multi-row header label combination.
    pub header_merge_policy: EnumHeaderMergePolicy,
}

impl SpecContext {
    /// Whether decode should label rows rather than pass grids through.
    pub fn if_label_rows(&self) -> bool {
        self.collection_mode && self.header_row_count > 0
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Header cell style contract handed to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<EnumHeaderAlign>,
}

/// Forced literal crossing the cell-writing boundary.
///
/// The writer stores each variant as a typed cell and never as a formula, so
/// numeric-looking text, leading zeros and `=`-prefixed strings are kept as
/// given.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellLiteral {
    /// Valueless cell.
    Blank,
    /// Literal text cell.
    Text(String),
    /// Literal numeric cell.
    Number(f64),
    /// Literal boolean cell.
    Boolean(bool),
}

/// Replacement texts for non-finite floats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecValuePolicy {
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecValuePolicy {
    fn default() -> Self {
        Self {
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Width decision for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecColumnWidth {
    /// Width in character units.
    pub width: usize,
    /// Whether the width is still content-derived.
    pub if_autosize: bool,
}

/// One assembled sheet, ready for the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetGrid {
    /// Resolved title (before container sanitization).
    pub title: String,
    /// Header row first, then data rows.
    pub rows: Vec<Vec<EnumCellLiteral>>,
    /// Per-column width plan; empty when autosize is off.
    pub widths: Vec<SpecColumnWidth>,
}

impl SpecSheetGrid {
    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DecodedSpecification

/// One cell of a labelled row.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumLabelledCell {
    /// Value of a labelled column.
    Scalar(Scalar),
    /// Columns without a header, by original column index.
    Unlabelled(BTreeMap<usize, Scalar>),
}

/// Decoded data row keyed by header label.
pub type LabelledRow = IndexMap<String, EnumLabelledCell>;

/// Decoded content of one sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumDecodedSheet {
    /// Collection mode: one labelled record per data row.
    Labelled(Vec<LabelledRow>),
    /// Raw grid, header rows included.
    Raw(Grid),
}

impl EnumDecodedSheet {
    /// JSON rendering (labelled rows as objects, raw grids as arrays).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Labelled(l_rows) => serde_json::Value::Array(
                l_rows
                    .iter()
                    .map(|row| {
                        serde_json::Value::Object(
                            row.iter()
                                .map(|(c_label, cell)| (c_label.clone(), labelled_cell_to_json(cell)))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            Self::Raw(grid) => serde_json::Value::Array(
                grid.iter()
                    .map(|row| serde_json::Value::Array(row.iter().map(Scalar::to_json).collect()))
                    .collect(),
            ),
        }
    }
}

fn labelled_cell_to_json(cell: &EnumLabelledCell) -> serde_json::Value {
    match cell {
        EnumLabelledCell::Scalar(val) => val.to_json(),
        EnumLabelledCell::Unlabelled(dict_cells) => serde_json::Value::Object(
            dict_cells
                .iter()
                .map(|(n_idx_col, val)| (n_idx_col.to_string(), val.to_json()))
                .collect(),
        ),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Sheet emitted by one encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Title resolved from the caller's sheet id.
    pub title_requested: String,
    /// Title actually written to the workbook.
    pub title: String,
    /// Rows written, header included.
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
}

/// Per-encode call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecEncodeReport {
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecEncodeReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        log::warn!("{}", msg.as_ref());
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
