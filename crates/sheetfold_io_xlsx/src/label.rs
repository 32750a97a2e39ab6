//! Row labelling: raw grids (header rows included) -> labelled records.

use std::collections::BTreeMap;

use crate::spec::{
    EnumDecodedSheet, EnumHeaderMergePolicy, EnumLabelledCell, Grid, LabelledRow, SpecContext,
};
use crate::value::Scalar;

/// Column index -> header label; blank header cells leave the column out.
pub type HeaderMap = BTreeMap<usize, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumLabelState {
    CollectingHeaders,
    LabellingRows,
}

/// Decode one sheet according to the resolved context.
///
/// Raw grids pass through untouched unless collection mode is on and at
/// least one header row is configured.
pub fn label_sheet(grid: Grid, context: &SpecContext) -> EnumDecodedSheet {
    if !context.if_label_rows() {
        return EnumDecodedSheet::Raw(grid);
    }
    EnumDecodedSheet::Labelled(label_rows(
        &grid,
        context.header_row_count,
        &context.unlabelled_key,
        context.header_merge_policy,
        &context.key_separator,
    ))
}

/// Combine header rows into one [`HeaderMap`].
///
/// With [`EnumHeaderMergePolicy::LastWins`] a later non-blank cell replaces the
/// label of its column; with [`EnumHeaderMergePolicy::Join`] labels are joined
/// with `separator`.
pub fn derive_header_map(
    header_rows: &[Vec<Scalar>],
    merge_policy: EnumHeaderMergePolicy,
    separator: &str,
) -> HeaderMap {
    let mut dict_headers = HeaderMap::new();
    for row in header_rows {
        for (n_idx_col, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let c_label = cell.to_text();
            let c_merged = match (merge_policy, dict_headers.get(&n_idx_col)) {
                (EnumHeaderMergePolicy::Join, Some(c_existing)) => {
                    format!("{c_existing}{separator}{c_label}")
                }
                _ => c_label,
            };
            dict_headers.insert(n_idx_col, c_merged);
        }
    }
    dict_headers
}

/// Label every row after the first `header_row_count` rows.
///
/// Output position is `source row index - header_row_count`. Columns sharing a
/// label overwrite each other left to right; unlabelled columns go to the
/// `unlabelled_key` bucket keyed by their original column index. A column
/// labelled like the bucket key joins the bucket when the row has one.
pub fn label_rows(
    grid: &Grid,
    header_row_count: usize,
    unlabelled_key: &str,
    merge_policy: EnumHeaderMergePolicy,
    separator: &str,
) -> Vec<LabelledRow> {
    let mut state = if header_row_count == 0 {
        EnumLabelState::LabellingRows
    } else {
        EnumLabelState::CollectingHeaders
    };
    let mut l_header_rows: Vec<Vec<Scalar>> = Vec::with_capacity(header_row_count);
    let mut dict_headers = HeaderMap::new();
    let mut l_rows_labelled = Vec::with_capacity(grid.len().saturating_sub(header_row_count));

    for row in grid {
        match state {
            EnumLabelState::CollectingHeaders => {
                l_header_rows.push(row.clone());
                if l_header_rows.len() == header_row_count {
                    dict_headers = derive_header_map(&l_header_rows, merge_policy, separator);
                    state = EnumLabelState::LabellingRows;
                }
            }
            EnumLabelState::LabellingRows => {
                l_rows_labelled.push(label_row(row, &dict_headers, unlabelled_key));
            }
        }
    }

    l_rows_labelled
}

fn label_row(row: &[Scalar], dict_headers: &HeaderMap, unlabelled_key: &str) -> LabelledRow {
    // a label equal to the bucket key joins the bucket when the row has one
    let if_bucket = (0..row.len()).any(|n_idx_col| !dict_headers.contains_key(&n_idx_col));

    let mut row_labelled = LabelledRow::new();
    for (n_idx_col, cell) in row.iter().enumerate() {
        match dict_headers.get(&n_idx_col) {
            Some(c_label) if !(if_bucket && c_label == unlabelled_key) => {
                row_labelled.insert(c_label.clone(), EnumLabelledCell::Scalar(cell.clone()));
            }
            _ => {
                let bucket = row_labelled
                    .entry(unlabelled_key.to_string())
                    .or_insert_with(|| EnumLabelledCell::Unlabelled(BTreeMap::new()));
                if let EnumLabelledCell::Unlabelled(dict_cells) = bucket {
                    dict_cells.insert(n_idx_col, cell.clone());
                }
            }
        }
    }
    row_labelled
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::conf::derive_default_context;

    fn s(val: &str) -> Scalar {
        Scalar::from(val)
    }

    #[test]
    fn test_sparse_header_row() {
        let l_header_rows = vec![vec![s(""), s("name"), Scalar::Null, s("age")]];
        let dict_headers = derive_header_map(&l_header_rows, EnumHeaderMergePolicy::LastWins, ".");
        assert_eq!(
            dict_headers,
            HeaderMap::from([(1, "name".to_string()), (3, "age".to_string())])
        );

        let grid = vec![
            l_header_rows[0].clone(),
            vec![s("x1"), s("Ann"), s("x3"), Scalar::Int(30)],
        ];
        let l_rows = label_rows(&grid, 1, "", EnumHeaderMergePolicy::LastWins, ".");

        let mut row_expected = LabelledRow::new();
        row_expected.insert(
            String::new(),
            EnumLabelledCell::Unlabelled(BTreeMap::from([(0, s("x1")), (2, s("x3"))])),
        );
        row_expected.insert("name".to_string(), EnumLabelledCell::Scalar(s("Ann")));
        row_expected.insert("age".to_string(), EnumLabelledCell::Scalar(Scalar::Int(30)));
        assert_eq!(l_rows, vec![row_expected]);
    }

    #[test]
    fn test_duplicate_labels_last_write_wins() {
        let grid = vec![
            vec![s("id"), s("dup"), s("dup")],
            vec![Scalar::Int(1), s("first"), s("second")],
        ];
        let l_rows = label_rows(&grid, 1, "", EnumHeaderMergePolicy::LastWins, ".");
        let l_keys: Vec<&str> = l_rows[0].keys().map(String::as_str).collect();
        assert_eq!(l_keys, vec!["id", "dup"]);
        assert_eq!(l_rows[0]["dup"], EnumLabelledCell::Scalar(s("second")));
    }

    #[test]
    fn test_multi_row_headers_last_and_join() {
        let grid = vec![
            vec![s("user"), Scalar::Null, s("meta")],
            vec![s("id"), s("name"), Scalar::Null],
            vec![Scalar::Int(7), s("Ann"), s("x")],
        ];

        let l_rows_last = label_rows(&grid, 2, "", EnumHeaderMergePolicy::LastWins, ".");
        let l_keys: Vec<&str> = l_rows_last[0].keys().map(String::as_str).collect();
        assert_eq!(l_keys, vec!["id", "name", "meta"]);

        let l_rows_join = label_rows(&grid, 2, "", EnumHeaderMergePolicy::Join, ".");
        let l_keys: Vec<&str> = l_rows_join[0].keys().map(String::as_str).collect();
        assert_eq!(l_keys, vec!["user.id", "name", "meta"]);
        assert_eq!(l_rows_join[0]["user.id"], EnumLabelledCell::Scalar(Scalar::Int(7)));
    }

    #[test]
    fn test_grid_shorter_than_header_count_yields_no_rows() {
        let grid = vec![vec![s("a")]];
        assert!(label_rows(&grid, 2, "", EnumHeaderMergePolicy::LastWins, ".").is_empty());
        assert!(label_rows(&grid, 1, "", EnumHeaderMergePolicy::LastWins, ".").is_empty());
    }

    #[test]
    fn test_custom_bucket_key() {
        let grid = vec![vec![s("a"), s("")], vec![Scalar::Int(1), Scalar::Int(2)]];
        let l_rows = label_rows(&grid, 1, "_extra", EnumHeaderMergePolicy::LastWins, ".");
        assert_eq!(
            l_rows[0]["_extra"],
            EnumLabelledCell::Unlabelled(BTreeMap::from([(1, Scalar::Int(2))]))
        );
    }

    #[test]
    fn test_label_named_like_bucket_joins_it_in_either_order() {
        let dict_expected = EnumLabelledCell::Unlabelled(BTreeMap::from([
            (0, Scalar::Int(1)),
            (1, Scalar::Int(2)),
        ]));

        let grid = vec![vec![s(""), s("_extra")], vec![Scalar::Int(1), Scalar::Int(2)]];
        let l_rows = label_rows(&grid, 1, "_extra", EnumHeaderMergePolicy::LastWins, ".");
        assert_eq!(l_rows[0]["_extra"], dict_expected);

        let grid = vec![vec![s("_extra"), s("")], vec![Scalar::Int(1), Scalar::Int(2)]];
        let l_rows = label_rows(&grid, 1, "_extra", EnumHeaderMergePolicy::LastWins, ".");
        assert_eq!(l_rows[0]["_extra"], dict_expected);

        // without unlabelled columns the label is an ordinary key
        let grid = vec![vec![s("_extra")], vec![Scalar::Int(1)]];
        let l_rows = label_rows(&grid, 1, "_extra", EnumHeaderMergePolicy::LastWins, ".");
        assert_eq!(l_rows[0]["_extra"], EnumLabelledCell::Scalar(Scalar::Int(1)));
    }

    #[test]
    fn test_raw_passthrough_when_collection_mode_off_or_no_headers() {
        let grid = vec![vec![s("a")], vec![Scalar::Int(1)]];

        let mut context = derive_default_context();
        context.collection_mode = false;
        assert_eq!(
            label_sheet(grid.clone(), &context),
            EnumDecodedSheet::Raw(grid.clone())
        );

        let mut context = derive_default_context();
        context.header_row_count = 0;
        assert_eq!(
            label_sheet(grid.clone(), &context),
            EnumDecodedSheet::Raw(grid)
        );
    }
}
