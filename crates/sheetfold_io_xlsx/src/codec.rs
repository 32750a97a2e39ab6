//! Public encode/decode facade.

use indexmap::IndexMap;

use crate::assemble::{assemble, derive_sheet_entries};
use crate::conf::{derive_default_context, derive_header_format};
use crate::context::{OptionBag, normalize_context};
use crate::error::{Result, SheetfoldError};
use crate::label::label_sheet;
use crate::reader::read_grids;
use crate::spec::{
    EnumContainerFormat, EnumDecodedSheet, SpecContext, SpecEncodeReport, SpecValuePolicy,
};
use crate::value::Value;
use crate::writer::XlsxSheetWriter;

/// Nested records <-> spreadsheet workbooks.
///
/// Holds instance-level option defaults; every call merges its own option
/// bag over them.
#[derive(Debug, Clone)]
pub struct SheetCodec {
    defaults: SpecContext,
    value_policy: SpecValuePolicy,
}

impl Default for SheetCodec {
    fn default() -> Self {
        Self {
            defaults: derive_default_context(),
            value_policy: SpecValuePolicy::default(),
        }
    }
}

impl SheetCodec {
    /// Codec whose defaults are `default_options` over the documented ones.
    pub fn new(default_options: &OptionBag) -> Result<Self> {
        Ok(Self {
            defaults: normalize_context(default_options, &derive_default_context())?,
            value_policy: SpecValuePolicy::default(),
        })
    }

    /// Override the texts written for non-finite floats.
    pub fn with_value_policy(mut self, value_policy: SpecValuePolicy) -> Self {
        self.value_policy = value_policy;
        self
    }

    /// Instance-level defaults, already resolved.
    pub fn defaults(&self) -> &SpecContext {
        &self.defaults
    }

    /// Resolve a call-level option bag against this codec's defaults.
    pub fn normalize_context(&self, options: &OptionBag) -> Result<SpecContext> {
        normalize_context(options, &self.defaults)
    }

    /// Only the modern container can be written.
    pub fn supports_encoding(&self, format: &str) -> bool {
        matches!(
            EnumContainerFormat::parse(format),
            Ok(EnumContainerFormat::Xlsx)
        )
    }

    pub fn supports_decoding(&self, format: &str) -> bool {
        EnumContainerFormat::parse(format).is_ok()
    }

    /// Encode sheets of records into a workbook payload.
    pub fn encode(&self, data: &Value, format: &str, options: &OptionBag) -> Result<Vec<u8>> {
        self.encode_with_report(data, format, options)
            .map(|(v_payload, _)| v_payload)
    }

    /// Same as [`Self::encode`], also returning what was written.
    pub fn encode_with_report(
        &self,
        data: &Value,
        format: &str,
        options: &OptionBag,
    ) -> Result<(Vec<u8>, SpecEncodeReport)> {
        let l_sheets = derive_sheet_entries(data)?;
        let context = self.normalize_context(options)?;
        if EnumContainerFormat::parse(format)? != EnumContainerFormat::Xlsx {
            return Err(SheetfoldError::unsupported_format(format));
        }

        let mut writer = XlsxSheetWriter::new(&derive_header_format(&context));
        for (n_idx_sheet, (sheet_key, rows)) in l_sheets.into_iter().enumerate() {
            let grid = assemble(&sheet_key, n_idx_sheet, rows, &context, &self.value_policy)?;
            writer.write_sheet(&grid)?;
        }
        writer.finish()
    }

    /// Decode a workbook payload into labelled rows or raw grids per sheet.
    ///
    /// Sheets without any row are left out.
    pub fn decode(
        &self,
        payload: &[u8],
        format: &str,
        options: &OptionBag,
    ) -> Result<IndexMap<String, EnumDecodedSheet>> {
        let context = self.normalize_context(options)?;
        let format = EnumContainerFormat::parse(format)?;

        let mut dict_sheets = IndexMap::new();
        for (sheet_name, grid) in read_grids(payload, format)? {
            if grid.is_empty() {
                log::debug!("skipping empty sheet {sheet_name:?}");
                continue;
            }
            log::debug!("decoding sheet {sheet_name:?} ({} rows)", grid.len());
            dict_sheets.insert(sheet_name, label_sheet(grid, &context));
        }
        Ok(dict_sheets)
    }
}
