//! On-disk representations of the user's records.
//!
//! Each document is tagged with a `_version` so the format can evolve without
//! breaking existing data directories.

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ItemStore, KnownAllergies, LogBook, LogEntry, ReactionItem};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
pub enum ItemsDocument {
    #[serde(rename = "1")]
    V1 { items: Vec<ItemRecord> },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    id: Uuid,
    name: String,
    raw_ingredients: String,
    ingredients: Vec<String>,
    created: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
pub enum AllergiesDocument {
    #[serde(rename = "1")]
    V1 { allergies: Vec<String> },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
pub enum LogDocument {
    #[serde(rename = "1")]
    V1 { entries: Vec<LogRecord> },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogRecord {
    id: Uuid,
    name: String,
    symptoms: String,
    date: DateTime<Utc>,
}

fn non_empty(field: &str, id: Uuid, value: String) -> Result<NonEmptyString, String> {
    NonEmptyString::new(value).map_err(|_| format!("record {id} has an empty {field}"))
}

impl From<&ItemStore> for ItemsDocument {
    fn from(store: &ItemStore) -> Self {
        let items = store
            .list()
            .iter()
            .map(|item| ItemRecord {
                id: item.id(),
                name: item.name().to_string(),
                raw_ingredients: item.raw_text().to_string(),
                ingredients: item.ingredients().to_vec(),
                created: item.created(),
            })
            .collect();
        Self::V1 { items }
    }
}

impl TryFrom<ItemsDocument> for ItemStore {
    type Error = String;

    fn try_from(document: ItemsDocument) -> Result<Self, Self::Error> {
        let ItemsDocument::V1 { items } = document;

        let mut store = Self::new();
        for record in items {
            let name = non_empty("name", record.id, record.name)?;
            let item = ReactionItem::from_parts(
                record.id,
                name,
                record.raw_ingredients,
                record.ingredients,
                record.created,
            );
            if !store.restore(item) {
                return Err(format!("duplicate item id {}", record.id));
            }
        }
        Ok(store)
    }
}

impl From<&KnownAllergies> for AllergiesDocument {
    fn from(allergies: &KnownAllergies) -> Self {
        Self::V1 {
            allergies: allergies.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<AllergiesDocument> for KnownAllergies {
    fn from(document: AllergiesDocument) -> Self {
        let AllergiesDocument::V1 { allergies } = document;
        allergies.into_iter().collect()
    }
}

impl From<&LogBook> for LogDocument {
    fn from(log: &LogBook) -> Self {
        let entries = log
            .entries()
            .iter()
            .map(|entry| LogRecord {
                id: entry.id(),
                name: entry.name().to_string(),
                symptoms: entry.symptoms().to_string(),
                date: entry.date(),
            })
            .collect();
        Self::V1 { entries }
    }
}

impl TryFrom<LogDocument> for LogBook {
    type Error = String;

    fn try_from(document: LogDocument) -> Result<Self, Self::Error> {
        let LogDocument::V1 { entries } = document;

        let mut log = Self::new();
        for record in entries {
            let name = non_empty("name", record.id, record.name)?;
            let symptoms = non_empty("symptoms", record.id, record.symptoms)?;
            log.restore(LogEntry::from_parts(record.id, name, symptoms, record.date));
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_document_uses_camel_case_and_version_tag() {
        let mut store = ItemStore::new();
        store.add(
            NonEmptyString::new("Ramen".to_string()).unwrap(),
            "Wheat, Soy".to_string(),
            vec!["wheat".to_string(), "soy".to_string()],
        );

        let json = serde_json::to_value(ItemsDocument::from(&store)).unwrap();

        assert_eq!(json["_version"], "1");
        assert_eq!(json["items"][0]["rawIngredients"], "Wheat, Soy");
        assert_eq!(json["items"][0]["ingredients"][1], "soy");
    }

    #[test]
    fn empty_item_name_is_rejected() {
        let json = r#"{"_version":"1","items":[{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","name":"","rawIngredients":"","ingredients":[],"created":"2024-01-01T00:00:00Z"}]}"#;
        let document: ItemsDocument = serde_json::from_str(json).unwrap();

        let error = ItemStore::try_from(document).unwrap_err();
        assert!(error.contains("empty name"));
    }

    #[test]
    fn duplicate_item_ids_are_rejected() {
        let record = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","name":"A","rawIngredients":"","ingredients":[],"created":"2024-01-01T00:00:00Z"}"#;
        let json = format!(r#"{{"_version":"1","items":[{record},{record}]}}"#);
        let document: ItemsDocument = serde_json::from_str(&json).unwrap();

        let error = ItemStore::try_from(document).unwrap_err();
        assert!(error.starts_with("duplicate item id"));
    }

    #[test]
    fn allergies_are_normalized_when_read() {
        let document: AllergiesDocument =
            serde_json::from_str(r#"{"_version":"1","allergies":["Soy","soy"," MILK "]}"#)
                .unwrap();

        let allergies = KnownAllergies::from(document);

        let names: Vec<_> = allergies.iter().collect();
        assert_eq!(names, ["milk", "soy"]);
    }
}
