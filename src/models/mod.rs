mod about;
mod catalog;
mod category;
mod collection;
mod main_section;
mod room;
mod slide;
mod user;

pub use about::{AboutPage, AboutSection, Link};
pub use catalog::{
    CatalogBanner, CatalogFilter, CatalogProduct, Characteristic, Color, FilterValue, TechnicalDoc,
};
pub use category::{Category, SubCategory};
pub use collection::{
    Collection, CollectionPreview, CollectionSection, FlexDirection, SectionImage, SectionType,
};
pub use main_section::{MainPage, MainSection, MainSectionKind};
pub use room::{ImageBlock, Room, RoomPage, RoomSection, RoomSectionKind};
pub use slide::ImageSlide;
pub use user::Identity;

/// Returns the id only when it refers to a persisted row.
///
/// Editing clients send `0` (or nothing) for entities that were never saved.
pub fn persisted_id(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_id_sentinels() {
        assert_eq!(persisted_id(None), None);
        assert_eq!(persisted_id(Some(0)), None);
        assert_eq!(persisted_id(Some(-3)), None);
        assert_eq!(persisted_id(Some(7)), Some(7));
    }
}
