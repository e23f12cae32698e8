//! Turning filtered catalog entries into a paginated XLSX report.

pub mod paginate;
pub mod workbook;

pub use paginate::{paginate, Pagination, SheetChunk};
pub use workbook::{build_workbook, WorkbookWriter};

/// Fixed header row: eight scalar columns, then slots for up to five image
/// URLs and three video URLs. Rows may spill past these labels when an entry
/// carries more media; the extra cells land in unlabeled columns.
pub const SHEET_HEADER: [&str; 16] = [
    "ID",
    "Name",
    "Category",
    "Price (in IDR)",
    "Weight (in Gram)",
    "Description",
    "Etalase",
    "Condition",
    "Image 1",
    "Image 2",
    "Image 3",
    "Image 4",
    "Image 5",
    "Video 1",
    "Video 2",
    "Video 3",
];

/// Column widths matching the header profile, in character units.
pub const COLUMN_WIDTHS: [f64; 16] = [
    4.0, 24.0, 14.0, 10.0, 10.0, 20.0, 14.0, 8.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0,
];
