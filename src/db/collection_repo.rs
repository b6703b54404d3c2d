use sqlx::{SqliteConnection, SqlitePool};

use super::reconcile::{self, Action, Bound, Child, Record, ReconcileReport, Scope, Table};
use super::{from_json, parse_timestamp, to_json, StoreError};
use crate::models::{
    persisted_id, Collection, CollectionPreview, CollectionSection, FlexDirection, SectionType,
};

const SECTIONS_OF_COLLECTION: &[Child] = &[Child {
    table: "collection_sections",
    foreign_key: "collection_id",
}];

pub(crate) const COLLECTIONS: Table = Table {
    name: "collections",
    columns: &[
        "name",
        "banner_image",
        "banner_title",
        "banner_description",
        "banner_link_text",
        "banner_link_url",
    ],
    timestamps: true,
    children: SECTIONS_OF_COLLECTION,
};

/// The collection fields a preview card controls.
const COLLECTION_BANNER: Table = Table {
    name: "collections",
    columns: &["name", "banner_image", "banner_title", "banner_description"],
    timestamps: true,
    children: SECTIONS_OF_COLLECTION,
};

pub(crate) const COLLECTION_SECTIONS: Table = Table {
    name: "collection_sections",
    columns: &[
        "type",
        "title",
        "description",
        "link_text",
        "link_url",
        "title_desc",
        "description_desc",
        "images",
        "order",
    ],
    timestamps: true,
    children: &[],
};

pub(crate) const COLLECTION_PREVIEWS: Table = Table {
    name: "collection_previews",
    columns: &["image", "title", "desc", "link", "flex_direction"],
    timestamps: false,
    children: &[],
};

const DEFAULT_LINK_TEXT: &str = "Learn more";

impl Record for Collection {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.name)
            .bind(&self.banner_image)
            .bind(&self.banner_title)
            .bind(&self.banner_description)
            .bind(&self.banner_link_text)
            .bind(&self.banner_link_url)
    }
}

impl Record for CollectionSection {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(self.kind)
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.link_text)
            .bind(&self.link_url)
            .bind(&self.title_desc)
            .bind(&self.description_desc)
            .bind(to_json(&self.images))
            .bind(self.order)
    }
}

impl Record for CollectionPreview {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.image)
            .bind(&self.title)
            .bind(&self.desc)
            .bind(&self.link)
            .bind(self.flex_direction)
    }
}

/// A preview seen through the collection columns it drives.
struct PreviewBanner<'a>(&'a CollectionPreview);

impl Record for PreviewBanner<'_> {
    fn id(&self) -> Option<i64> {
        self.0.id()
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.0.title)
            .bind(&self.0.image)
            .bind(&self.0.title)
            .bind(&self.0.desc)
    }
}

/// The collection created alongside a new preview card.
fn collection_for_preview(preview: &CollectionPreview) -> Collection {
    Collection {
        banner_image: Some(preview.image.clone()),
        banner_title: Some(preview.title.clone()),
        banner_description: Some(preview.desc.clone()),
        banner_link_text: Some(DEFAULT_LINK_TEXT.to_string()),
        banner_link_url: Some(preview.link.clone()),
        ..Collection::new(preview.title.clone())
    }
}

/// The placeholder section every new collection starts with.
fn starter_section() -> CollectionSection {
    CollectionSection::new(SectionType::Section, "New section", 0)
        .with_description("Section description")
}

async fn collection_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM collections WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Brings the collection paired with preview `id` in line with it.
///
/// A missing collection is recreated under the preview's id.
async fn sync_paired_collection(
    conn: &mut SqliteConnection,
    id: i64,
    preview: &CollectionPreview,
) -> Result<bool, sqlx::Error> {
    if collection_exists(conn, id).await? {
        reconcile::update_row(conn, &COLLECTION_BANNER, id, &PreviewBanner(preview)).await
    } else {
        let collection = collection_for_preview(preview);
        reconcile::insert_row(conn, &COLLECTIONS, Some(id), None, &collection).await?;
        Ok(true)
    }
}

#[derive(sqlx::FromRow)]
struct PreviewRow {
    id: i64,
    image: String,
    title: String,
    desc: String,
    link: String,
    flex_direction: FlexDirection,
}

#[derive(sqlx::FromRow)]
struct CollectionRow {
    id: i64,
    name: String,
    banner_image: Option<String>,
    banner_title: Option<String>,
    banner_description: Option<String>,
    banner_link_text: Option<String>,
    banner_link_url: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct SectionRow {
    id: i64,
    collection_id: Option<i64>,
    #[sqlx(rename = "type")]
    kind: SectionType,
    title: String,
    description: String,
    link_text: Option<String>,
    link_url: Option<String>,
    title_desc: Option<String>,
    description_desc: Option<String>,
    images: String,
    order: i64,
    created_at: String,
    updated_at: String,
}

impl From<PreviewRow> for CollectionPreview {
    fn from(row: PreviewRow) -> Self {
        CollectionPreview {
            id: Some(row.id),
            image: row.image,
            title: row.title,
            desc: row.desc,
            link: row.link,
            flex_direction: row.flex_direction,
        }
    }
}

impl From<SectionRow> for CollectionSection {
    fn from(row: SectionRow) -> Self {
        CollectionSection {
            id: Some(row.id),
            collection_id: row.collection_id,
            kind: row.kind,
            title: row.title,
            description: row.description,
            link_text: row.link_text,
            link_url: row.link_url,
            title_desc: row.title_desc,
            description_desc: row.description_desc,
            images: from_json(&row.images),
            order: row.order,
            created_at: Some(parse_timestamp(&row.created_at)),
            updated_at: Some(parse_timestamp(&row.updated_at)),
        }
    }
}

#[derive(Clone)]
pub struct CollectionRepository {
    pool: SqlitePool,
}

impl CollectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_previews(&self) -> Result<Vec<CollectionPreview>, StoreError> {
        let rows: Vec<PreviewRow> = sqlx::query_as("SELECT * FROM collection_previews ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CollectionPreview::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Collection>, StoreError> {
        let row: Option<CollectionRow> = sqlx::query_as("SELECT * FROM collections WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.hydrate_collection(row).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Collection>, StoreError> {
        let row: Option<CollectionRow> =
            sqlx::query_as("SELECT * FROM collections WHERE name = ? ORDER BY id LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_collection(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Saves a collection detail page and reconciles its sections.
    ///
    /// A collection submitted with an id that is not persisted is rejected
    /// with [`StoreError::NotFound`] and nothing is written.
    pub async fn save_collection(
        &self,
        collection: &Collection,
    ) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut report = ReconcileReport::default();

        let id = match persisted_id(collection.id) {
            Some(id) => {
                if !collection_exists(&mut tx, id).await? {
                    return Err(StoreError::NotFound(format!("Collection {}", id)));
                }
                if reconcile::update_row(&mut tx, &COLLECTIONS, id, collection).await? {
                    report.updated.push(id);
                } else {
                    report.unchanged.push(id);
                }
                id
            }
            None => {
                let id = reconcile::insert_row(&mut tx, &COLLECTIONS, None, None, collection).await?;
                report.inserted.push(id);
                id
            }
        };

        let sections = reconcile::reconcile(
            &mut tx,
            &COLLECTION_SECTIONS,
            Some(Scope::new("collection_id", id)),
            &collection.sections,
        )
        .await?;
        report.absorb(sections);
        report.ids = vec![id];

        tx.commit().await?;
        Ok(report)
    }

    /// Reconciles preview cards and their collections in lockstep.
    ///
    /// A new preview creates a collection (with one starter section) and takes
    /// its id. A preview missing from the list is deleted along with its
    /// collection and that collection's sections.
    pub async fn save_previews(
        &self,
        previews: &[CollectionPreview],
    ) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut existing = reconcile::snapshot(&mut tx, &COLLECTION_PREVIEWS, None).await?;
        let actions = reconcile::partition(&mut existing, previews.iter().map(Record::id));

        let mut report = ReconcileReport::default();
        let mut ids = vec![0; previews.len()];

        for (index, (preview, action)) in previews.iter().zip(&actions).enumerate() {
            if let Action::Update(id) = *action {
                let card_changed =
                    reconcile::update_row(&mut tx, &COLLECTION_PREVIEWS, id, preview).await?;
                let collection_changed = sync_paired_collection(&mut tx, id, preview).await?;
                if card_changed || collection_changed {
                    report.updated.push(id);
                } else {
                    report.unchanged.push(id);
                }
                ids[index] = id;
            }
        }

        for (index, (preview, action)) in previews.iter().zip(&actions).enumerate() {
            if *action == Action::Insert {
                let collection = collection_for_preview(preview);
                let id = reconcile::insert_row(&mut tx, &COLLECTIONS, None, None, &collection).await?;
                reconcile::insert_row(&mut tx, &COLLECTION_PREVIEWS, Some(id), None, preview)
                    .await?;
                reconcile::insert_row(
                    &mut tx,
                    &COLLECTION_SECTIONS,
                    None,
                    Some(Scope::new("collection_id", id)),
                    &starter_section(),
                )
                .await?;
                report.inserted.push(id);
                ids[index] = id;
            }
        }

        let mut stale: Vec<i64> = existing.into_iter().collect();
        stale.sort_unstable();
        for id in stale {
            reconcile::delete_row(&mut tx, &COLLECTIONS, id).await?;
            reconcile::delete_row(&mut tx, &COLLECTION_PREVIEWS, id).await?;
            report.deleted.push(id);
        }

        report.ids = ids;
        tx.commit().await?;
        Ok(report)
    }

    async fn hydrate_collection(&self, row: CollectionRow) -> Result<Collection, StoreError> {
        let sections: Vec<SectionRow> = sqlx::query_as(
            "SELECT * FROM collection_sections WHERE collection_id = ? ORDER BY \"order\", id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Collection {
            id: Some(row.id),
            name: row.name,
            banner_image: row.banner_image,
            banner_title: row.banner_title,
            banner_description: row.banner_description,
            banner_link_text: row.banner_link_text,
            banner_link_url: row.banner_link_url,
            sections: sections.into_iter().map(CollectionSection::from).collect(),
            created_at: Some(parse_timestamp(&row.created_at)),
            updated_at: Some(parse_timestamp(&row.updated_at)),
        })
    }
}
