//! Notion database settings.

use std::fmt;

use serde::{Deserialize, Serialize};

fn default_title_property() -> String {
    "Name".to_string()
}

fn default_due_property() -> String {
    "End Date".to_string()
}

fn default_join_key_property() -> String {
    "ics_uid".to_string()
}

fn default_category_property() -> String {
    "Category".to_string()
}

fn default_subcategory_property() -> String {
    "Subcategory".to_string()
}

/// Names of the database properties duesync reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyNames {
    #[serde(default = "default_title_property")]
    pub title: String,
    #[serde(default = "default_due_property")]
    pub due: String,
    /// Rich-text property holding the feed UID
    #[serde(default = "default_join_key_property")]
    pub join_key: String,
    #[serde(default = "default_category_property")]
    pub category: String,
    #[serde(default = "default_subcategory_property")]
    pub subcategory: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        PropertyNames {
            title: default_title_property(),
            due: default_due_property(),
            join_key: default_join_key_property(),
            category: default_category_property(),
            subcategory: default_subcategory_property(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Internal integration token
    pub token: String,
    pub database_id: String,
    /// Page every synced record is related to through the category property
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub properties: PropertyNames,
}

impl fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"<redacted>")
            .field("database_id", &self.database_id)
            .field("category_id", &self.category_id)
            .field("properties", &self.properties)
            .finish()
    }
}
