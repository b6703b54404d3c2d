use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalDoc {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub article: String,
    /// Price in minor currency units.
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
    #[serde(default)]
    pub technical_docs: Vec<TechnicalDoc>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub sub_category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CatalogProduct {
    pub fn new(name: impl Into<String>, article: impl Into<String>, price: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            article: article.into(),
            price,
            description: None,
            images: Vec::new(),
            colors: Vec::new(),
            characteristics: Vec::new(),
            technical_docs: Vec::new(),
            category_id: None,
            sub_category_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_characteristics(mut self, characteristics: Vec<Characteristic>) -> Self {
        self.characteristics = characteristics;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<FilterValue>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub order: i64,
}

/// The catalog page banner. There is at most one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogBanner {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub image: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link_text: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_payloads_roundtrip_verbatim() {
        let product = CatalogProduct::new("Basin mixer", "BM-100", 12900)
            .with_colors(vec![Color {
                name: "Chrome".into(),
                code: "#c0c0c0".into(),
            }])
            .with_characteristics(vec![Characteristic {
                name: "Material".into(),
                value: "Brass".into(),
            }]);

        let json = serde_json::to_string(&product).unwrap();
        let parsed: CatalogProduct = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, product);
    }

    #[test]
    fn test_filter_type_field() {
        let json = r#"{"name":"Color","type":"checkbox","values":[{"label":"White","value":"white"}]}"#;
        let filter: CatalogFilter = serde_json::from_str(json).unwrap();

        assert_eq!(filter.kind, "checkbox");
        assert_eq!(filter.values.len(), 1);
        assert_eq!(filter.order, 0);
    }
}
