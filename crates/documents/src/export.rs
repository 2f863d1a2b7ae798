//! CSV export of document lists.

use crate::parser::CanonicalDocument;

/// Header line of the exported file.
pub const CSV_HEADER: &str = "Katalogsignatur, Titel, Datensatz-Identifier";

/// Serializes documents as CSV text.
///
/// Returns `None` for an empty list. Rows hold the catalog signature, title
/// and record id, separated by `\n` with no trailing newline. Absent values
/// become empty cells.
///
/// # Example
/// ```
/// use geosearch_documents::{to_csv, CanonicalDocument};
///
/// let none: [&CanonicalDocument; 0] = [];
/// assert_eq!(to_csv(none), None);
/// ```
pub fn to_csv<'a, I>(documents: I) -> Option<String>
where
    I: IntoIterator<Item = &'a CanonicalDocument>,
{
    let rows: Vec<String> = documents.into_iter().map(csv_row).collect();
    if rows.is_empty() {
        return None;
    }

    Some(format!("{CSV_HEADER}\n{}", rows.join("\n")))
}

fn csv_row(document: &CanonicalDocument) -> String {
    let p = &document.properties;
    [&p.shelfmark_usi, &p.title, &p.record_id]
        .into_iter()
        .map(|field| escape_field(field.as_deref().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a cell if it contains a delimiter, quote or line break.
pub fn escape_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
