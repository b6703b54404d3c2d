use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layout of a preview card on the collections page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum FlexDirection {
    #[default]
    #[serde(rename = "xl:flex-row")]
    #[sqlx(rename = "xl:flex-row")]
    Row,
    #[serde(rename = "xl:flex-row-reverse")]
    #[sqlx(rename = "xl:flex-row-reverse")]
    RowReverse,
}

/// A card on the collections page. Shares its id with a [`Collection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPreview {
    #[serde(default)]
    pub id: Option<i64>,
    pub image: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub flex_direction: FlexDirection,
}

impl CollectionPreview {
    pub fn new(title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: None,
            image: image.into(),
            title: title.into(),
            desc: String::new(),
            link: String::new(),
            flex_direction: FlexDirection::Row,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SectionType {
    #[default]
    Section,
    Section2,
    Section3,
    Section4,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSection {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub collection_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link_text: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub title_desc: Option<String>,
    #[serde(default)]
    pub description_desc: Option<String>,
    #[serde(default)]
    pub images: Vec<SectionImage>,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CollectionSection {
    pub fn new(kind: SectionType, title: impl Into<String>, order: i64) -> Self {
        Self {
            id: None,
            collection_id: None,
            kind,
            title: title.into(),
            description: String::new(),
            link_text: None,
            link_url: None,
            title_desc: None,
            description_desc: None,
            images: Vec::new(),
            order,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_images(mut self, images: Vec<SectionImage>) -> Self {
        self.images = images;
        self
    }
}

/// A collection detail page with its sections, ordered by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub banner_title: Option<String>,
    #[serde(default)]
    pub banner_description: Option<String>,
    #[serde(default)]
    pub banner_link_text: Option<String>,
    #[serde(default)]
    pub banner_link_url: Option<String>,
    #[serde(default)]
    pub sections: Vec<CollectionSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            banner_image: None,
            banner_title: None,
            banner_description: None,
            banner_link_text: None,
            banner_link_url: None,
            sections: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_sections(mut self, sections: Vec<CollectionSection>) -> Self {
        self.sections = sections;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_direction_wire_names() {
        assert_eq!(
            serde_json::to_string(&FlexDirection::RowReverse).unwrap(),
            "\"xl:flex-row-reverse\""
        );
        let parsed: FlexDirection = serde_json::from_str("\"xl:flex-row\"").unwrap();
        assert_eq!(parsed, FlexDirection::Row);
    }

    #[test]
    fn test_section_type_field_is_named_type() {
        let json = r#"{"type":"section3","title":"Gallery","order":2}"#;
        let section: CollectionSection = serde_json::from_str(json).unwrap();

        assert_eq!(section.kind, SectionType::Section3);
        assert!(section.images.is_empty());

        let back = serde_json::to_value(&section).unwrap();
        assert_eq!(back["type"], "section3");
    }
}
