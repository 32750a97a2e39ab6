//! `sheetfold_io_xlsx` v1:
//! Nested records <-> header-labelled spreadsheet rows.
//!
//! Modules:
//! - `conf`     : constants, option keys and default presets
//! - `spec`     : specs/models/options
//! - `value`    : caller-facing nested value model
//! - `error`    : error taxonomy
//! - `context`  : option bag normalization
//! - `flatten`  : nested record -> dotted-path row
//! - `assemble` : flattened rows -> titled literal grid
//! - `label`    : raw grid -> labelled rows
//! - `util`     : pure helper functions
//! - `writer`   : rust_xlsxwriter kernel
//! - `reader`   : calamine kernel
//! - `codec`    : encode/decode facade
pub mod assemble;
pub mod codec;
pub mod conf;
pub mod context;
pub mod error;
pub mod flatten;
pub mod label;
pub mod reader;
pub mod spec;
pub mod util;
pub mod value;
pub mod writer;

pub use codec::SheetCodec;
pub use conf::{
    C_OPT_COLLECTION_MODE, C_OPT_COLUMN_AUTOSIZE, C_OPT_COLUMN_MAX_WIDTH, C_OPT_HEADER_ALIGN,
    C_OPT_HEADER_BOLD, C_OPT_HEADER_MERGE_POLICY, C_OPT_HEADER_ROW_COUNT, C_OPT_KEY_SEPARATOR,
    C_OPT_UNLABELLED_KEY, derive_default_context,
};
pub use context::{OptionBag, derive_context_bag, normalize_context};
pub use error::{Result, SheetfoldError};
pub use flatten::flatten;
pub use label::{HeaderMap, derive_header_map, label_rows, label_sheet};
pub use spec::{
    EnumCellLiteral, EnumContainerFormat, EnumDecodedSheet, EnumHeaderAlign,
    EnumHeaderMergePolicy, EnumLabelledCell, EnumSheetKey, FlatRow, Grid, LabelledRow,
    SpecCellFormat, SpecContext, SpecEncodeReport, SpecSheetGrid, SpecSheetReport,
    SpecValuePolicy,
};
pub use value::{ExposeFields, Record, Scalar, Value};
