use std::collections::HashSet;

use serde::Deserialize;

use crate::error::FetchError;

/// The JSON payload embedded in the catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub product: Vec<CatalogEntry>,
}

/// One product record as the remote API ships it.
///
/// `images` and `videos` default to empty when absent so a sparse record
/// still yields a row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub id: f64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub weight: f64,
    pub description: String,
    pub etalase: String,
    pub condition: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
}

/// A single spreadsheet cell. IDs, prices and weights stay numeric in the
/// sheet; everything else is text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
}

impl CatalogEntry {
    /// The ID rendered as text, which is the form the allow-list stores.
    /// Whole numbers print without a decimal point, matching how the
    /// catalog page itself displays them.
    pub fn id_text(&self) -> String {
        self.id.to_string()
    }

    /// Flatten the entry into its row: eight fixed cells, then one cell per
    /// image URL, then one per video URL. Never padded, never truncated.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        let fixed = [
            Cell::Number(self.id),
            Cell::Text(&self.name),
            Cell::Text(&self.category),
            Cell::Number(self.price),
            Cell::Number(self.weight),
            Cell::Text(&self.description),
            Cell::Text(&self.etalase),
            Cell::Text(&self.condition),
        ];
        fixed
            .into_iter()
            .chain(self.images.iter().map(|url| Cell::Text(url)))
            .chain(self.videos.iter().map(|url| Cell::Text(url)))
    }

    pub fn cell_count(&self) -> usize {
        8 + self.images.len() + self.videos.len()
    }
}

/// Decode the extracted payload text into the catalog.
pub fn parse_payload(text: &str) -> Result<Catalog, FetchError> {
    let catalog: Catalog = serde_json::from_str(text)?;
    Ok(catalog)
}

/// Keep the entries whose ID, rendered as text, appears in the allow-list.
///
/// Payload order is preserved; allow-list order and duplicates are
/// irrelevant. Matching is exact string equality, so a list entry "1001"
/// matches ID 1001 while " 1001" and "1001.0" match nothing.
pub fn filter_entries(catalog: Catalog, allow: &[String]) -> Vec<CatalogEntry> {
    let wanted: HashSet<&str> = allow.iter().map(String::as_str).collect();
    catalog
        .product
        .into_iter()
        .filter(|entry| wanted.contains(entry.id_text().as_str()))
        .collect()
}
