use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which block of the home page a section fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MainSectionKind {
    Intro,
    Banner,
    Feature,
    Collections,
    Showcase,
}

impl MainSectionKind {
    pub const ALL: [MainSectionKind; 5] = [
        MainSectionKind::Intro,
        MainSectionKind::Banner,
        MainSectionKind::Feature,
        MainSectionKind::Collections,
        MainSectionKind::Showcase,
    ];
}

impl fmt::Display for MainSectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainSectionKind::Intro => write!(f, "intro"),
            MainSectionKind::Banner => write!(f, "banner"),
            MainSectionKind::Feature => write!(f, "feature"),
            MainSectionKind::Collections => write!(f, "collections"),
            MainSectionKind::Showcase => write!(f, "showcase"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainSection {
    #[serde(default)]
    pub id: Option<i64>,
    pub section: MainSectionKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link_name: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image_block_srcs: Vec<String>,
    #[serde(default)]
    pub image_block_alts: Vec<String>,
    #[serde(default)]
    pub image_block_descs: Vec<String>,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MainSection {
    pub fn new(section: MainSectionKind, order: i64) -> Self {
        Self {
            id: None,
            section,
            title: None,
            description: None,
            link_name: None,
            link_url: None,
            main_image: None,
            images: Vec::new(),
            image_block_srcs: Vec::new(),
            image_block_alts: Vec::new(),
            image_block_descs: Vec::new(),
            order,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// The home page as the storefront renders it: the first section of each kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MainPage {
    pub intro: Option<MainSection>,
    pub banner: Option<MainSection>,
    pub feature: Option<MainSection>,
    pub collections: Option<MainSection>,
    pub showcase: Option<MainSection>,
}

impl MainPage {
    /// Picks the first section of each kind, in the order given.
    pub fn from_sections(sections: Vec<MainSection>) -> Self {
        let mut page = MainPage::default();
        for section in sections {
            let slot = match section.section {
                MainSectionKind::Intro => &mut page.intro,
                MainSectionKind::Banner => &mut page.banner,
                MainSectionKind::Feature => &mut page.feature,
                MainSectionKind::Collections => &mut page.collections,
                MainSectionKind::Showcase => &mut page.showcase,
            };
            if slot.is_none() {
                *slot = Some(section);
            }
        }
        page
    }
}
