use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog category with the subcategories shown under it in the header menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            images: Vec::new(),
            sub_categories: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn with_sub_categories(mut self, sub_categories: Vec<SubCategory>) -> Self {
        self.sub_categories = sub_categories;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub href: String,
    /// Owning category. Ignored on save; the parent in the submitted tree wins.
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl SubCategory {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            href: href.into(),
            category_id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}
