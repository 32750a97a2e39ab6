//! Just enough BIFF8 + CFB to hand a legacy workbook to the reader.

use std::io::{Cursor, Write};

const RECORD_BOF: u16 = 0x0809;
const RECORD_EOF: u16 = 0x000A;
const RECORD_CODEPAGE: u16 = 0x0042;
const RECORD_WINDOW1: u16 = 0x003D;
const RECORD_FONT: u16 = 0x0031;
const RECORD_XF: u16 = 0x00E0;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_SST: u16 = 0x00FC;
const RECORD_DIMENSIONS: u16 = 0x0200;
const RECORD_WINDOW2: u16 = 0x023E;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_LABELSST: u16 = 0x00FD;
const RECORD_BOOLERR: u16 = 0x0205;

const BOF_VERSION_BIFF8: u16 = 0x0600;
const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_DT_WORKSHEET: u16 = 0x0010;

const CODEPAGE_WINDOWS_1252: u16 = 1252;
const XF_FLAG_LOCKED: u16 = 0x0001;
const XF_FLAG_STYLE: u16 = 0x0004;
const XF_CELL_DEFAULT: u16 = 16;

/// One stored cell of a fixture sheet.
#[derive(Debug, Clone, Copy)]
pub enum FixtureCell {
    Text(&'static str),
    Number(f64),
    Bool(bool),
    Empty,
}

/// Build a single-sheet `.xls` workbook holding `rows`.
pub fn build_single_sheet_fixture_xls(sheet_name: &str, rows: &[Vec<FixtureCell>]) -> Vec<u8> {
    let mut l_strings: Vec<&str> = Vec::new();
    for cell in rows.iter().flatten() {
        if let FixtureCell::Text(val) = *cell {
            if !l_strings.contains(&val) {
                l_strings.push(val);
            }
        }
    }

    let sheet_stream = build_sheet_stream(rows, &l_strings);
    let workbook_stream = build_workbook_stream(sheet_name, &sheet_stream, &l_strings);

    let cursor = Cursor::new(Vec::new());
    let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
    {
        let mut stream = ole.create_stream("Workbook").expect("Workbook stream");
        stream
            .write_all(&workbook_stream)
            .expect("write Workbook stream");
    }
    ole.into_inner().into_inner()
}

fn build_workbook_stream(sheet_name: &str, sheet_stream: &[u8], l_strings: &[&str]) -> Vec<u8> {
    let mut globals = Vec::<u8>::new();

    push_record(&mut globals, RECORD_BOF, &bof(BOF_DT_WORKBOOK_GLOBALS));
    push_record(&mut globals, RECORD_CODEPAGE, &CODEPAGE_WINDOWS_1252.to_le_bytes());
    push_record(&mut globals, RECORD_WINDOW1, &window1());
    push_record(&mut globals, RECORD_FONT, &font("Arial"));

    // 16 style XFs, then the default cell XF
    for _ in 0..XF_CELL_DEFAULT {
        push_record(&mut globals, RECORD_XF, &xf_record(true));
    }
    push_record(&mut globals, RECORD_XF, &xf_record(false));

    let n_boundsheet_start = globals.len();
    let mut boundsheet = Vec::<u8>::new();
    boundsheet.extend_from_slice(&0u32.to_le_bytes()); // lbPlyPos, patched below
    boundsheet.extend_from_slice(&0u16.to_le_bytes()); // visible worksheet
    write_short_unicode_string(&mut boundsheet, sheet_name);
    push_record(&mut globals, RECORD_BOUNDSHEET, &boundsheet);
    let n_offset_pos = n_boundsheet_start + 4;

    push_record(&mut globals, RECORD_SST, &sst(l_strings));
    push_record(&mut globals, RECORD_EOF, &[]);

    let n_sheet_offset = globals.len() as u32;
    globals[n_offset_pos..n_offset_pos + 4].copy_from_slice(&n_sheet_offset.to_le_bytes());

    globals.extend_from_slice(sheet_stream);
    globals
}

fn build_sheet_stream(rows: &[Vec<FixtureCell>], l_strings: &[&str]) -> Vec<u8> {
    let mut sheet = Vec::<u8>::new();
    push_record(&mut sheet, RECORD_BOF, &bof(BOF_DT_WORKSHEET));

    let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut dims = Vec::<u8>::new();
    dims.extend_from_slice(&0u32.to_le_bytes()); // first row
    dims.extend_from_slice(&(rows.len() as u32).to_le_bytes()); // last row + 1
    dims.extend_from_slice(&0u16.to_le_bytes()); // first col
    dims.extend_from_slice(&(n_cols as u16).to_le_bytes()); // last col + 1
    dims.extend_from_slice(&0u16.to_le_bytes()); // reserved
    push_record(&mut sheet, RECORD_DIMENSIONS, &dims);

    push_record(&mut sheet, RECORD_WINDOW2, &window2());

    for (n_row, row) in rows.iter().enumerate() {
        for (n_col, cell) in row.iter().enumerate() {
            let mut data = Vec::<u8>::new();
            data.extend_from_slice(&(n_row as u16).to_le_bytes());
            data.extend_from_slice(&(n_col as u16).to_le_bytes());
            data.extend_from_slice(&XF_CELL_DEFAULT.to_le_bytes());
            let n_record = match cell {
                FixtureCell::Text(val) => {
                    let n_isst = l_strings
                        .iter()
                        .position(|c_string| c_string == val)
                        .expect("string in SST") as u32;
                    data.extend_from_slice(&n_isst.to_le_bytes());
                    RECORD_LABELSST
                }
                FixtureCell::Number(val) => {
                    data.extend_from_slice(&val.to_le_bytes());
                    RECORD_NUMBER
                }
                FixtureCell::Bool(val) => {
                    data.push(u8::from(*val));
                    data.push(0); // fError = 0: boolean
                    RECORD_BOOLERR
                }
                FixtureCell::Empty => continue,
            };
            push_record(&mut sheet, n_record, &data);
        }
    }

    push_record(&mut sheet, RECORD_EOF, &[]);
    sheet
}

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&BOF_VERSION_BIFF8.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes()); // build
    out[6..8].copy_from_slice(&0x07CCu16.to_le_bytes()); // year
    out
}

fn window1() -> [u8; 18] {
    let mut out = [0u8; 18];
    out[14..16].copy_from_slice(&1u16.to_le_bytes()); // cTabSel
    out[16..18].copy_from_slice(&600u16.to_le_bytes()); // wTabRatio
    out
}

fn window2() -> [u8; 18] {
    let mut out = [0u8; 18];
    out[0..2].copy_from_slice(&0x02B6u16.to_le_bytes());
    out
}

fn font(name: &str) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&200u16.to_le_bytes()); // height, 10pt
    out.extend_from_slice(&0u16.to_le_bytes()); // option flags
    out.extend_from_slice(&0x7FFFu16.to_le_bytes()); // automatic color
    out.extend_from_slice(&400u16.to_le_bytes()); // weight
    out.extend_from_slice(&0u16.to_le_bytes()); // escapement
    out.extend_from_slice(&[0, 0, 0, 0]); // underline, family, charset, reserved
    write_short_unicode_string(&mut out, name);
    out
}

fn xf_record(is_style_xf: bool) -> [u8; 20] {
    let mut out = [0u8; 20];
    let flags: u16 = XF_FLAG_LOCKED | if is_style_xf { XF_FLAG_STYLE } else { 0 };
    out[4..6].copy_from_slice(&flags.to_le_bytes());
    out[6] = 0x20; // General + Bottom
    out[9] = 0x3F;
    out
}

fn sst(l_strings: &[&str]) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    let n_strings = l_strings.len() as u32;
    out.extend_from_slice(&n_strings.to_le_bytes()); // cstTotal
    out.extend_from_slice(&n_strings.to_le_bytes()); // cstUnique
    for c_string in l_strings {
        write_unicode_string(&mut out, c_string);
    }
    out
}

fn write_short_unicode_string(out: &mut Vec<u8>, s: &str) {
    // ShortXLUnicodeString: [cch: u8][flags: u8][chars]
    let bytes = s.as_bytes();
    out.push(u8::try_from(bytes.len()).expect("string too long for u8 length"));
    out.push(0); // compressed (8-bit)
    out.extend_from_slice(bytes);
}

fn write_unicode_string(out: &mut Vec<u8>, s: &str) {
    // XLUnicodeString: [cch: u16][flags: u8][chars]
    let bytes = s.as_bytes();
    let n_len = u16::try_from(bytes.len()).expect("string too long for u16 length");
    out.extend_from_slice(&n_len.to_le_bytes());
    out.push(0); // compressed (8-bit)
    out.extend_from_slice(bytes);
}
