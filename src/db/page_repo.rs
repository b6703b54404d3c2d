use sqlx::SqlitePool;

use super::reconcile::{self, Bound, Record, ReconcileReport, Table};
use super::{from_json, parse_timestamp, to_json, StoreError};
use crate::models::{
    persisted_id, AboutPage, ImageSlide, MainPage, MainSection, MainSectionKind, Room, RoomPage,
    RoomSection, RoomSectionKind,
};

pub(crate) const SLIDES: Table = Table {
    name: "image_slides",
    columns: &["desktop_image", "mobile_image", "title"],
    timestamps: false,
    children: &[],
};

pub(crate) const MAIN_SECTIONS: Table = Table {
    name: "main_sections",
    columns: &[
        "section",
        "title",
        "description",
        "link_name",
        "link_url",
        "main_image",
        "images",
        "image_block_srcs",
        "image_block_alts",
        "image_block_descs",
        "order",
    ],
    timestamps: true,
    children: &[],
};

pub(crate) const ABOUT_PAGE: Table = Table {
    name: "about_page",
    columns: &[
        "banner_name",
        "banner_image",
        "banner_title",
        "banner_description",
        "banner_link",
        "sections",
    ],
    timestamps: false,
    children: &[],
};

const ROOM_COLUMNS: &[&str] = &[
    "section",
    "title",
    "description",
    "name",
    "image",
    "images",
    "link_text",
    "link_url",
    "order",
];

pub(crate) const BATHROOM_SECTIONS: Table = Table {
    name: "bathroom_sections",
    columns: ROOM_COLUMNS,
    timestamps: true,
    children: &[],
};

pub(crate) const KITCHEN_SECTIONS: Table = Table {
    name: "kitchen_sections",
    columns: ROOM_COLUMNS,
    timestamps: true,
    children: &[],
};

fn room_table(room: Room) -> &'static Table {
    match room {
        Room::Bathroom => &BATHROOM_SECTIONS,
        Room::Kitchen => &KITCHEN_SECTIONS,
    }
}

impl Record for ImageSlide {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.desktop_image)
            .bind(&self.mobile_image)
            .bind(&self.title)
    }
}

impl Record for MainSection {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(self.section)
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.link_name)
            .bind(&self.link_url)
            .bind(&self.main_image)
            .bind(to_json(&self.images))
            .bind(to_json(&self.image_block_srcs))
            .bind(to_json(&self.image_block_alts))
            .bind(to_json(&self.image_block_descs))
            .bind(self.order)
    }
}

impl Record for AboutPage {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.banner_name)
            .bind(&self.banner_image)
            .bind(&self.banner_title)
            .bind(&self.banner_description)
            .bind(to_json(&self.banner_link))
            .bind(to_json(&self.sections))
    }
}

impl Record for RoomSection {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(self.section)
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.name)
            .bind(&self.image)
            .bind(to_json(&self.images))
            .bind(&self.link_text)
            .bind(&self.link_url)
            .bind(self.order)
    }
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct SlideRow {
    id: i64,
    desktop_image: String,
    mobile_image: String,
    title: String,
}

#[derive(sqlx::FromRow)]
struct MainSectionRow {
    id: i64,
    section: MainSectionKind,
    title: Option<String>,
    description: Option<String>,
    link_name: Option<String>,
    link_url: Option<String>,
    main_image: Option<String>,
    images: String,
    image_block_srcs: String,
    image_block_alts: String,
    image_block_descs: String,
    order: i64,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct AboutPageRow {
    id: i64,
    banner_name: String,
    banner_image: String,
    banner_title: String,
    banner_description: String,
    banner_link: String,
    sections: String,
}

#[derive(sqlx::FromRow)]
struct RoomSectionRow {
    id: i64,
    section: RoomSectionKind,
    title: Option<String>,
    description: Option<String>,
    name: Option<String>,
    image: Option<String>,
    images: String,
    link_text: Option<String>,
    link_url: Option<String>,
    order: i64,
    created_at: String,
    updated_at: String,
}

impl From<SlideRow> for ImageSlide {
    fn from(row: SlideRow) -> Self {
        ImageSlide {
            id: Some(row.id),
            desktop_image: row.desktop_image,
            mobile_image: row.mobile_image,
            title: row.title,
        }
    }
}

impl From<MainSectionRow> for MainSection {
    fn from(row: MainSectionRow) -> Self {
        MainSection {
            id: Some(row.id),
            section: row.section,
            title: row.title,
            description: row.description,
            link_name: row.link_name,
            link_url: row.link_url,
            main_image: row.main_image,
            images: from_json(&row.images),
            image_block_srcs: from_json(&row.image_block_srcs),
            image_block_alts: from_json(&row.image_block_alts),
            image_block_descs: from_json(&row.image_block_descs),
            order: row.order,
            created_at: Some(parse_timestamp(&row.created_at)),
            updated_at: Some(parse_timestamp(&row.updated_at)),
        }
    }
}

impl From<AboutPageRow> for AboutPage {
    fn from(row: AboutPageRow) -> Self {
        AboutPage {
            id: Some(row.id),
            banner_name: row.banner_name,
            banner_image: row.banner_image,
            banner_title: row.banner_title,
            banner_description: row.banner_description,
            banner_link: from_json(&row.banner_link),
            sections: from_json(&row.sections),
        }
    }
}

impl From<RoomSectionRow> for RoomSection {
    fn from(row: RoomSectionRow) -> Self {
        RoomSection {
            id: Some(row.id),
            section: row.section,
            title: row.title,
            description: row.description,
            name: row.name,
            image: row.image,
            images: from_json(&row.images),
            link_text: row.link_text,
            link_url: row.link_url,
            order: row.order,
            created_at: Some(parse_timestamp(&row.created_at)),
            updated_at: Some(parse_timestamp(&row.updated_at)),
        }
    }
}

/// Home page, carousel, about page and room pages.
#[derive(Clone)]
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_slides(&self) -> Result<Vec<ImageSlide>, StoreError> {
        let rows: Vec<SlideRow> = sqlx::query_as("SELECT * FROM image_slides ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ImageSlide::from).collect())
    }

    pub async fn save_slides(&self, slides: &[ImageSlide]) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let report = reconcile::reconcile(&mut tx, &SLIDES, None, slides).await?;
        tx.commit().await?;
        Ok(report)
    }

    pub async fn list_main_sections(&self) -> Result<Vec<MainSection>, StoreError> {
        let rows: Vec<MainSectionRow> =
            sqlx::query_as("SELECT * FROM main_sections ORDER BY \"order\", id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(MainSection::from).collect())
    }

    pub async fn main_page(&self) -> Result<MainPage, StoreError> {
        // First row of each kind by id, matching how the storefront picks them.
        let rows: Vec<MainSectionRow> = sqlx::query_as("SELECT * FROM main_sections ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(MainPage::from_sections(
            rows.into_iter().map(MainSection::from).collect(),
        ))
    }

    pub async fn save_main_sections(
        &self,
        sections: &[MainSection],
    ) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let report = reconcile::reconcile(&mut tx, &MAIN_SECTIONS, None, sections).await?;
        tx.commit().await?;
        Ok(report)
    }

    pub async fn about_page(&self) -> Result<Option<AboutPage>, StoreError> {
        let row: Option<AboutPageRow> =
            sqlx::query_as("SELECT * FROM about_page ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(AboutPage::from))
    }

    pub async fn save_about_page(&self, page: &AboutPage) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let report = reconcile::save_singleton(&mut tx, &ABOUT_PAGE, page).await?;
        tx.commit().await?;
        Ok(report)
    }

    pub async fn list_room_sections(&self, room: Room) -> Result<Vec<RoomSection>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY \"order\", id",
            room_table(room).name
        );
        let rows: Vec<RoomSectionRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RoomSection::from).collect())
    }

    pub async fn room_page(&self, room: Room) -> Result<RoomPage, StoreError> {
        Ok(RoomPage::from_sections(self.list_room_sections(room).await?))
    }

    pub async fn save_room_sections(
        &self,
        room: Room,
        sections: &[RoomSection],
    ) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let report = reconcile::reconcile(&mut tx, room_table(room), None, sections).await?;
        tx.commit().await?;
        Ok(report)
    }
}
