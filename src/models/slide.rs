use serde::{Deserialize, Serialize};

/// One slide of the home page carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSlide {
    #[serde(default)]
    pub id: Option<i64>,
    pub desktop_image: String,
    pub mobile_image: String,
    pub title: String,
}

impl ImageSlide {
    pub fn new(
        title: impl Into<String>,
        desktop_image: impl Into<String>,
        mobile_image: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            desktop_image: desktop_image.into(),
            mobile_image: mobile_image.into(),
            title: title.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}
