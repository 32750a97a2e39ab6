//! Constants, option keys and default presets.

use crate::spec::{EnumHeaderAlign, EnumHeaderMergePolicy, SpecCellFormat, SpecContext};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Hard column width cap of the container.
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;

/// Largest integer magnitude a cell double holds exactly (`2^53`).
pub const N_INT_EXACT_F64_MAX: u64 = 1 << 53;

/// Prefix of synthesized titles for positionally indexed sheets.
pub const C_SHEET_TITLE_POSITIONAL_PREFIX: &str = "Sheet_";

/// Padding added to estimated column widths.
pub const N_WIDTH_CELL_PADDING: usize = 2;

/// Leading bytes of an OLE2 compound document (legacy `.xls`).
pub const TUP_MAGIC_OLE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// Leading bytes of a ZIP local file header (`.xlsx`).
pub const TUP_MAGIC_ZIP: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Prefix of temporary artifacts staged for the collaborators.
pub const C_TMP_FILE_PREFIX: &str = "sheetfold_";

////////////////////////////////////////////////////////////////////////////////
// #region OptionKeys

/// Select labelled rows (`true`) or raw grids (`false`) on decode.
pub const C_OPT_COLLECTION_MODE: &str = "collectionMode";
/// Separator between nested key segments.
pub const C_OPT_KEY_SEPARATOR: &str = "keySeparator";
/// Render header cells in bold.
pub const C_OPT_HEADER_BOLD: &str = "headerBold";
/// Horizontal alignment of header cells.
pub const C_OPT_HEADER_ALIGN: &str = "headerAlign";
/// Estimate column widths from content.
pub const C_OPT_COLUMN_AUTOSIZE: &str = "columnAutosize";
/// Upper bound for estimated column widths.
pub const C_OPT_COLUMN_MAX_WIDTH: &str = "columnMaxWidth";
/// Number of leading rows read as headers on decode.
pub const C_OPT_HEADER_ROW_COUNT: &str = "headerRowCount";
/// Key under which unlabelled columns are collected on decode.
pub const C_OPT_UNLABELLED_KEY: &str = "unlabelledKey";
/// How labels from several header rows combine.
pub const C_OPT_HEADER_MERGE_POLICY: &str = "headerMergePolicy";

/// All recognized option keys, in normalization order.
pub const TUP_OPTION_KEYS: [&str; 9] = [
    C_OPT_COLLECTION_MODE,
    C_OPT_KEY_SEPARATOR,
    C_OPT_HEADER_BOLD,
    C_OPT_HEADER_ALIGN,
    C_OPT_COLUMN_AUTOSIZE,
    C_OPT_COLUMN_MAX_WIDTH,
    C_OPT_HEADER_ROW_COUNT,
    C_OPT_UNLABELLED_KEY,
    C_OPT_HEADER_MERGE_POLICY,
];

// #endregion
////////////////////////////////////////////////////////////////////////////////

/// Documented defaults every option bag is resolved against.
pub fn derive_default_context() -> SpecContext {
    SpecContext {
        collection_mode: true,
        key_separator: ".".to_string(),
        header_bold: true,
        header_align: EnumHeaderAlign::Center,
        column_autosize: true,
        column_max_width: 50,
        header_row_count: 1,
        unlabelled_key: String::new(),
        header_merge_policy: EnumHeaderMergePolicy::LastWins,
    }
}

/// Header cell format derived from the resolved context.
pub fn derive_header_format(context: &SpecContext) -> SpecCellFormat {
    SpecCellFormat {
        bold: Some(context.header_bold),
        align: Some(context.header_align),
    }
}
