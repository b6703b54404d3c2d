use serde::{Deserialize, Serialize};

/// A `{text, url}` link stored as part of a page payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutSection {
    pub title: String,
    pub description: String,
}

/// The about page. There is at most one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutPage {
    #[serde(default)]
    pub id: Option<i64>,
    pub banner_name: String,
    pub banner_image: String,
    pub banner_title: String,
    pub banner_description: String,
    pub banner_link: Link,
    #[serde(default)]
    pub sections: Vec<AboutSection>,
}
