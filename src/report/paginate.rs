use crate::catalog::CatalogEntry;

pub const SHEET_NAME_PREFIX: &str = "Product Report Sheet ";

/// Sheet sizing knobs.
///
/// The stock behavior packs `base_capacity` rows into every sheet and names
/// sheets with a plain counter. Legacy mode reproduces the original report
/// generator, whose growing threshold chased a single cursor over the whole
/// row set: the first sheet holds `base_capacity` rows, every later sheet
/// holds `increment`, and names derive from the threshold rather than a
/// counter. Keep it off unless sheet layout must match old exports.
///
/// Both `base_capacity` and `increment` are treated as at least 1;
/// `Config::validate` rejects smaller values before a run starts and
/// `paginate` clamps whatever it is handed.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub base_capacity: usize,
    pub increment: usize,
    pub legacy_growth: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            base_capacity: 100,
            increment: 100,
            legacy_growth: false,
        }
    }
}

/// One worksheet's worth of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetChunk {
    pub name: String,
    pub rows: Vec<CatalogEntry>,
}

/// Split the filtered rows into named sheet chunks.
///
/// Zero rows yield zero chunks, never a single empty one. Concatenating the
/// chunks' rows in order reproduces the input exactly.
pub fn paginate(rows: Vec<CatalogEntry>, pagination: &Pagination) -> Vec<SheetChunk> {
    // A zero capacity or increment would stop the cursor from ever
    // advancing; treat either as 1.
    let pagination = Pagination {
        base_capacity: pagination.base_capacity.max(1),
        increment: pagination.increment.max(1),
        legacy_growth: pagination.legacy_growth,
    };
    if pagination.legacy_growth {
        paginate_legacy(rows, &pagination)
    } else {
        paginate_constant(rows, &pagination)
    }
}

fn paginate_constant(rows: Vec<CatalogEntry>, pagination: &Pagination) -> Vec<SheetChunk> {
    let mut chunks = Vec::new();
    let mut rest = rows;
    while !rest.is_empty() {
        let take = rest.len().min(pagination.base_capacity);
        let remainder = rest.split_off(take);
        chunks.push(SheetChunk {
            name: format!("{SHEET_NAME_PREFIX}{}", chunks.len() + 1),
            rows: rest,
        });
        rest = remainder;
    }
    chunks
}

fn paginate_legacy(rows: Vec<CatalogEntry>, pagination: &Pagination) -> Vec<SheetChunk> {
    let mut chunks = Vec::new();
    let mut threshold = pagination.base_capacity;
    // The cursor is global and never resets per sheet, so after the first
    // sheet each threshold bump only leaves room for `increment` rows.
    let mut cursor = 0usize;
    let mut rest = rows;
    while !rest.is_empty() {
        let take = threshold.saturating_sub(cursor).min(rest.len());
        let remainder = rest.split_off(take);
        cursor += take;
        chunks.push(SheetChunk {
            name: legacy_sheet_name(threshold),
            rows: rest,
        });
        rest = remainder;
        threshold += pagination.increment;
    }
    chunks
}

/// Names derive from the capacity threshold divided by 100, so non-default
/// settings produce fractional names like "Product Report Sheet 1.5".
fn legacy_sheet_name(threshold: usize) -> String {
    format!("{SHEET_NAME_PREFIX}{}", threshold as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<CatalogEntry> {
        (0..n)
            .map(|i| CatalogEntry {
                id: 1000.0 + i as f64,
                name: format!("Product {i}"),
                category: "Test".to_string(),
                price: 1000.0,
                weight: 100.0,
                description: String::new(),
                etalase: String::new(),
                condition: "New".to_string(),
                images: Vec::new(),
                videos: Vec::new(),
            })
            .collect()
    }

    fn sizes(chunks: &[SheetChunk]) -> Vec<usize> {
        chunks.iter().map(|c| c.rows.len()).collect()
    }

    fn names(chunks: &[SheetChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.name.as_str()).collect()
    }

    fn concat_ids(chunks: &[SheetChunk]) -> Vec<String> {
        chunks
            .iter()
            .flat_map(|c| c.rows.iter().map(|r| r.id_text()))
            .collect()
    }

    #[test]
    fn zero_rows_produce_zero_chunks() {
        let pagination = Pagination::default();
        assert!(paginate(Vec::new(), &pagination).is_empty());

        let legacy = Pagination {
            legacy_growth: true,
            ..Pagination::default()
        };
        assert!(paginate(Vec::new(), &legacy).is_empty());
    }

    #[test]
    fn default_settings_split_250_rows_into_three_sheets() {
        let chunks = paginate(rows(250), &Pagination::default());
        assert_eq!(sizes(&chunks), [100, 100, 50]);
        assert_eq!(
            names(&chunks),
            [
                "Product Report Sheet 1",
                "Product Report Sheet 2",
                "Product Report Sheet 3"
            ]
        );
    }

    #[test]
    fn legacy_mode_matches_stock_output_at_default_settings() {
        let pagination = Pagination {
            legacy_growth: true,
            ..Pagination::default()
        };
        let chunks = paginate(rows(250), &pagination);
        assert_eq!(sizes(&chunks), [100, 100, 50]);
        assert_eq!(
            names(&chunks),
            [
                "Product Report Sheet 1",
                "Product Report Sheet 2",
                "Product Report Sheet 3"
            ]
        );
    }

    #[test]
    fn legacy_growth_shrinks_later_sheets_and_names_fractionally() {
        let pagination = Pagination {
            base_capacity: 100,
            increment: 50,
            legacy_growth: true,
        };
        let chunks = paginate(rows(250), &pagination);
        assert_eq!(sizes(&chunks), [100, 50, 50, 50]);
        assert_eq!(
            names(&chunks),
            [
                "Product Report Sheet 1",
                "Product Report Sheet 1.5",
                "Product Report Sheet 2",
                "Product Report Sheet 2.5"
            ]
        );
    }

    #[test]
    fn constant_mode_ignores_the_increment() {
        let pagination = Pagination {
            base_capacity: 100,
            increment: 50,
            legacy_growth: false,
        };
        let chunks = paginate(rows(250), &pagination);
        assert_eq!(sizes(&chunks), [100, 100, 50]);
    }

    #[test]
    fn zero_capacities_fall_back_to_single_row_sheets() {
        let input = rows(3);
        let expected: Vec<String> = input.iter().map(|r| r.id_text()).collect();

        for legacy_growth in [false, true] {
            let pagination = Pagination {
                base_capacity: 0,
                increment: 0,
                legacy_growth,
            };
            let chunks = paginate(input.clone(), &pagination);
            assert_eq!(sizes(&chunks), [1, 1, 1]);
            assert_eq!(concat_ids(&chunks), expected);
        }
    }

    #[test]
    fn exact_boundary_leaves_no_empty_tail_sheet() {
        for legacy_growth in [false, true] {
            let pagination = Pagination {
                legacy_growth,
                ..Pagination::default()
            };
            let chunks = paginate(rows(200), &pagination);
            assert_eq!(sizes(&chunks), [100, 100]);
        }
    }

    #[test]
    fn concatenated_chunks_reproduce_the_input_in_order() {
        let input = rows(237);
        let expected: Vec<String> = input.iter().map(|r| r.id_text()).collect();

        for legacy_growth in [false, true] {
            let pagination = Pagination {
                base_capacity: 75,
                increment: 40,
                legacy_growth,
            };
            let chunks = paginate(input.clone(), &pagination);
            assert_eq!(concat_ids(&chunks), expected);
        }
    }

    #[test]
    fn small_row_set_fits_one_sheet() {
        let chunks = paginate(rows(10), &Pagination::default());
        assert_eq!(sizes(&chunks), [10]);
        assert_eq!(names(&chunks), ["Product Report Sheet 1"]);
    }
}
