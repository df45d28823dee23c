//! The demo's item processors.

use crawlkit::{CrawlerError, ErrorKind, Item, ProcessItem};

/// Copies the item and stamps a `number` field with the field count, unless
/// one is already present.
pub fn numbering_processor() -> ProcessItem {
    Box::new(|item: &Item| {
        if item.is_empty() {
            return Err(CrawlerError::new(ErrorKind::ItemProcessor, "the item is empty"));
        }
        let mut result = item.clone();
        if !result.contains_key("number") {
            result.insert(
                "number".to_string(),
                serde_json::Value::from(result.len() as u64),
            );
        }
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_field_is_added_once() {
        let processor = numbering_processor();
        let mut item = Item::new();
        item.insert("a.text".to_string(), serde_json::Value::from("link"));

        let first = processor(&item).expect("process");
        assert_eq!(first["number"], 1);

        let second = processor(&first).expect("process again");
        assert_eq!(second["number"], 1, "an existing number field is kept");
    }

    #[test]
    fn test_empty_item_is_an_error() {
        let processor = numbering_processor();
        assert!(processor(&Item::new()).is_err());
    }
}
