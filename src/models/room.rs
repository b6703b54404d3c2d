use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A per-room landing page. Each room keeps its sections in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    Bathroom,
    Kitchen,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Bathroom => write!(f, "bathroom"),
            Room::Kitchen => write!(f, "kitchen"),
        }
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bathroom" => Ok(Room::Bathroom),
            "kitchen" => Ok(Room::Kitchen),
            _ => Err(format!(
                "Invalid room '{}'. Valid options: bathroom, kitchen",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RoomSectionKind {
    Banner,
    Section,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSection {
    #[serde(default)]
    pub id: Option<i64>,
    pub section: RoomSectionKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageBlock>,
    #[serde(default)]
    pub link_text: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoomSection {
    pub fn new(section: RoomSectionKind, order: i64) -> Self {
        Self {
            id: None,
            section,
            title: None,
            description: None,
            name: None,
            image: None,
            images: Vec::new(),
            link_text: None,
            link_url: None,
            order,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_images(mut self, images: Vec<ImageBlock>) -> Self {
        self.images = images;
        self
    }
}

/// A room page grouped the way the storefront renders it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomPage {
    pub banner: Option<RoomSection>,
    pub sections: Vec<RoomSection>,
    pub collections: Vec<RoomSection>,
}

impl RoomPage {
    /// Groups sections that are already sorted by `order`.
    pub fn from_sections(sections: Vec<RoomSection>) -> Self {
        let mut page = RoomPage::default();
        for section in sections {
            match section.section {
                RoomSectionKind::Banner => {
                    if page.banner.is_none() {
                        page.banner = Some(section);
                    }
                }
                RoomSectionKind::Section => page.sections.push(section),
                RoomSectionKind::Collection => page.collections.push(section),
            }
        }
        page
    }
}
