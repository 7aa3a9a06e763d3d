//! CRM card payload served back to HubSpot.
//!
//! HubSpot fetches the card data URL when a user opens a contact record and
//! renders one row per result. The `link` of each row is a viewer-page URL
//! with a freshly minted access token embedded, so clicking it opens the
//! document without any further authentication round-trip.
//!
//! The field names (`objectId`, `title`, `link`) are fixed by the CRM card
//! contract, hence the camelCase serialization.

use serde::Serialize;

/// Card data response: one entry per attachment of the displayed record.
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub results: Vec<CardEntry>,
}

/// One row of the CRM card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    /// Row identifier, unique within the card
    pub object_id: u64,

    /// Row label shown to the user (the attachment's filename)
    pub title: String,

    /// Tokenized viewer-page URL
    pub link: String,
}

impl CardResponse {
    /// Build the card from `(filename, view_url)` pairs, numbering rows from 1.
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let results = entries
            .into_iter()
            .enumerate()
            .map(|(index, (title, link))| CardEntry {
                object_id: index as u64 + 1,
                title,
                link,
            })
            .collect();

        Self { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_rows_are_numbered_from_one() {
        let card = CardResponse::new(vec![
            ("a.pdf".to_string(), "https://x/1".to_string()),
            ("b.pdf".to_string(), "https://x/2".to_string()),
        ]);

        assert_eq!(card.results.len(), 2);
        assert_eq!(card.results[0].object_id, 1);
        assert_eq!(card.results[1].object_id, 2);
        assert_eq!(card.results[1].title, "b.pdf");
    }

    #[test]
    fn card_serializes_with_hubspot_field_names() {
        let card = CardResponse::new(vec![("a.pdf".to_string(), "https://x/1".to_string())]);
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["results"][0]["objectId"], 1);
        assert_eq!(json["results"][0]["title"], "a.pdf");
        assert_eq!(json["results"][0]["link"], "https://x/1");
    }
}
