use sqlx::SqlitePool;

use super::reconcile::{self, Bound, Record, ReconcileReport, Scope, Table};
use super::{from_json, parse_timestamp, to_json, StoreError};
use crate::models::{persisted_id, CatalogBanner, CatalogFilter, CatalogProduct};

pub(crate) const PRODUCTS: Table = Table {
    name: "catalog_products",
    columns: &[
        "name",
        "article",
        "price",
        "description",
        "images",
        "colors",
        "characteristics",
        "technical_docs",
        "category_id",
        "sub_category_id",
    ],
    timestamps: true,
    children: &[],
};

pub(crate) const FILTERS: Table = Table {
    name: "catalog_filters",
    columns: &["name", "type", "values", "category_id", "order"],
    timestamps: false,
    children: &[],
};

pub(crate) const BANNER: Table = Table {
    name: "catalog_banner",
    columns: &[
        "name",
        "image",
        "title",
        "description",
        "link_text",
        "link_url",
    ],
    timestamps: true,
    children: &[],
};

impl Record for CatalogProduct {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.name)
            .bind(&self.article)
            .bind(self.price)
            .bind(&self.description)
            .bind(to_json(&self.images))
            .bind(to_json(&self.colors))
            .bind(to_json(&self.characteristics))
            .bind(to_json(&self.technical_docs))
            .bind(self.category_id)
            .bind(self.sub_category_id)
    }
}

impl Record for CatalogFilter {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.name)
            .bind(&self.kind)
            .bind(to_json(&self.values))
            .bind(self.category_id)
            .bind(self.order)
    }
}

impl Record for CatalogBanner {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query
            .bind(&self.name)
            .bind(&self.image)
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.link_text)
            .bind(&self.link_url)
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    article: String,
    price: i64,
    description: Option<String>,
    images: String,
    colors: String,
    characteristics: String,
    technical_docs: String,
    category_id: Option<i64>,
    sub_category_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct FilterRow {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
    values: String,
    category_id: Option<i64>,
    order: i64,
}

#[derive(sqlx::FromRow)]
struct BannerRow {
    id: i64,
    name: String,
    image: String,
    title: String,
    description: Option<String>,
    link_text: Option<String>,
    link_url: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        CatalogProduct {
            id: Some(row.id),
            name: row.name,
            article: row.article,
            price: row.price,
            description: row.description,
            images: from_json(&row.images),
            colors: from_json(&row.colors),
            characteristics: from_json(&row.characteristics),
            technical_docs: from_json(&row.technical_docs),
            category_id: row.category_id,
            sub_category_id: row.sub_category_id,
            created_at: Some(parse_timestamp(&row.created_at)),
            updated_at: Some(parse_timestamp(&row.updated_at)),
        }
    }
}

impl From<FilterRow> for CatalogFilter {
    fn from(row: FilterRow) -> Self {
        CatalogFilter {
            id: Some(row.id),
            name: row.name,
            kind: row.kind,
            values: from_json(&row.values),
            category_id: row.category_id,
            order: row.order,
        }
    }
}

impl From<BannerRow> for CatalogBanner {
    fn from(row: BannerRow) -> Self {
        CatalogBanner {
            id: Some(row.id),
            name: row.name,
            image: row.image,
            title: row.title,
            description: row.description,
            link_text: row.link_text,
            link_url: row.link_url,
            created_at: Some(parse_timestamp(&row.created_at)),
            updated_at: Some(parse_timestamp(&row.updated_at)),
        }
    }
}

/// Items saved under a category scope belong to that category.
///
/// The scope overrides whatever `category_id` an item carries, so every row
/// written stays inside the set the next scoped snapshot reads.
fn assign_category<T: Clone>(
    items: &[T],
    category: Option<i64>,
    slot: impl Fn(&mut T) -> &mut Option<i64>,
) -> Vec<T> {
    let Some(category_id) = category else {
        return items.to_vec();
    };
    items
        .iter()
        .cloned()
        .map(|mut item| {
            *slot(&mut item) = Some(category_id);
            item
        })
        .collect()
}

#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Products in id order, optionally only those of one category.
    pub async fn list_products(
        &self,
        category: Option<i64>,
    ) -> Result<Vec<CatalogProduct>, StoreError> {
        let rows: Vec<ProductRow> = match category {
            Some(category_id) => {
                sqlx::query_as("SELECT * FROM catalog_products WHERE category_id = ? ORDER BY id")
                    .bind(category_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM catalog_products ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<CatalogProduct>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM catalog_products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogProduct::from))
    }

    /// Reconciles the product list, or only one category's products when
    /// `category` is set.
    pub async fn save_products(
        &self,
        category: Option<i64>,
        products: &[CatalogProduct],
    ) -> Result<ReconcileReport, StoreError> {
        let products = assign_category(products, category, |p| &mut p.category_id);
        let scope = category.map(|id| Scope::new("category_id", id));

        let mut tx = self.pool.begin().await?;
        let report = reconcile::reconcile(&mut tx, &PRODUCTS, scope, &products).await?;
        tx.commit().await?;
        Ok(report)
    }

    pub async fn list_filters(
        &self,
        category: Option<i64>,
    ) -> Result<Vec<CatalogFilter>, StoreError> {
        let rows: Vec<FilterRow> = match category {
            Some(category_id) => {
                sqlx::query_as(
                    "SELECT * FROM catalog_filters WHERE category_id = ? ORDER BY \"order\", id",
                )
                .bind(category_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM catalog_filters ORDER BY \"order\", id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(CatalogFilter::from).collect())
    }

    pub async fn save_filters(
        &self,
        category: Option<i64>,
        filters: &[CatalogFilter],
    ) -> Result<ReconcileReport, StoreError> {
        let filters = assign_category(filters, category, |f| &mut f.category_id);
        let scope = category.map(|id| Scope::new("category_id", id));

        let mut tx = self.pool.begin().await?;
        let report = reconcile::reconcile(&mut tx, &FILTERS, scope, &filters).await?;
        tx.commit().await?;
        Ok(report)
    }

    pub async fn banner(&self) -> Result<Option<CatalogBanner>, StoreError> {
        let row: Option<BannerRow> =
            sqlx::query_as("SELECT * FROM catalog_banner ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(CatalogBanner::from))
    }

    pub async fn save_banner(&self, banner: &CatalogBanner) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let report = reconcile::save_singleton(&mut tx, &BANNER, banner).await?;
        tx.commit().await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{setup_db, TestDb};
    use crate::db::{CategoryRepository, SubcategoryPolicy};
    use crate::models::{Category, Characteristic, Color, FilterValue};
    use proptest::prelude::*;

    fn repo(db: &TestDb) -> CatalogRepository {
        CatalogRepository::new(db.pool.clone())
    }

    async fn seed_categories(db: &TestDb) -> (i64, i64) {
        let report = CategoryRepository::new(db.pool.clone())
            .save(
                &[Category::new("Faucets"), Category::new("Sinks")],
                SubcategoryPolicy::Upsert,
            )
            .await
            .unwrap();
        (report.ids[0], report.ids[1])
    }

    fn filter(name: &str, order: i64) -> CatalogFilter {
        CatalogFilter {
            id: None,
            name: name.into(),
            kind: "checkbox".into(),
            values: vec![FilterValue {
                label: "White".into(),
                value: "white".into(),
            }],
            category_id: None,
            order,
        }
    }

    fn banner(title: &str) -> CatalogBanner {
        CatalogBanner {
            id: None,
            name: "catalog".into(),
            image: "/catalog.jpg".into(),
            title: title.into(),
            description: None,
            link_text: Some("Shop now".into()),
            link_url: Some("/catalog".into()),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_product_payloads_survive_storage() {
        let db = setup_db().await;
        let repo = repo(&db);

        let product = CatalogProduct::new("Basin mixer", "BM-100", 12900)
            .with_colors(vec![Color {
                name: "Chrome".into(),
                code: "#c0c0c0".into(),
            }])
            .with_characteristics(vec![Characteristic {
                name: "Material".into(),
                value: "Brass".into(),
            }]);
        let id = repo.save_products(None, &[product]).await.unwrap().ids[0];

        let saved = repo.get_product(id).await.unwrap().unwrap();
        assert_eq!(saved.price, 12900);
        assert_eq!(saved.colors[0].code, "#c0c0c0");
        assert_eq!(saved.characteristics[0].value, "Brass");
        assert!(repo.get_product(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scoped_save_leaves_other_categories_alone() {
        let db = setup_db().await;
        let repo = repo(&db);
        let (faucets, sinks) = seed_categories(&db).await;

        repo.save_products(
            None,
            &[
                CatalogProduct::new("Mixer", "M-1", 100).with_category(faucets),
                CatalogProduct::new("Basin", "B-1", 200).with_category(sinks),
            ],
        )
        .await
        .unwrap();

        let report = repo
            .save_products(Some(faucets), &[CatalogProduct::new("Tap", "T-1", 50)])
            .await
            .unwrap();
        assert_eq!(report.deleted.len(), 1);

        let in_faucets = repo.list_products(Some(faucets)).await.unwrap();
        assert_eq!(in_faucets.len(), 1);
        assert_eq!(in_faucets[0].name, "Tap");
        assert_eq!(in_faucets[0].category_id, Some(faucets));

        let in_sinks = repo.list_products(Some(sinks)).await.unwrap();
        assert_eq!(in_sinks[0].name, "Basin");
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let db = setup_db().await;
        let repo = repo(&db);

        let result = repo
            .save_products(None, &[CatalogProduct::new("Mixer", "M-1", -1)])
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(repo.list_products(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_products() {
        let db = setup_db().await;
        let repo = repo(&db);
        let (faucets, sinks) = seed_categories(&db).await;

        repo.save_products(Some(faucets), &[CatalogProduct::new("Mixer", "M-1", 100)])
            .await
            .unwrap();

        let categories = CategoryRepository::new(db.pool.clone());
        let remaining: Vec<Category> = categories
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.id == Some(sinks))
            .collect();
        categories
            .save(&remaining, SubcategoryPolicy::Upsert)
            .await
            .unwrap();

        let products = repo.list_products(None).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].category_id, None);
    }

    #[tokio::test]
    async fn test_filters_are_ordered_and_scoped() {
        let db = setup_db().await;
        let repo = repo(&db);
        let (faucets, _) = seed_categories(&db).await;

        repo.save_filters(Some(faucets), &[filter("Size", 2), filter("Color", 1)])
            .await
            .unwrap();

        let filters = repo.list_filters(Some(faucets)).await.unwrap();
        let names: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Color", "Size"]);
        assert_eq!(filters[0].values[0].value, "white");
        assert!(filters.iter().all(|f| f.category_id == Some(faucets)));
    }

    #[tokio::test]
    async fn test_banner_is_a_singleton() {
        let db = setup_db().await;
        let repo = repo(&db);

        assert!(repo.banner().await.unwrap().is_none());

        let first = repo.save_banner(&banner("Catalog")).await.unwrap();
        let second = repo.save_banner(&banner("All products")).await.unwrap();

        assert_eq!(first.inserted, second.updated);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_banner")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(repo.banner().await.unwrap().unwrap().title, "All products");
    }

    #[tokio::test]
    async fn test_scoped_resubmit_keeps_foreign_category_item_in_scope() {
        let db = setup_db().await;
        let repo = repo(&db);
        let (faucets, sinks) = seed_categories(&db).await;

        let mixer = CatalogProduct::new("Mixer", "M-1", 100).with_category(sinks);
        let first = repo
            .save_products(Some(faucets), &[mixer.clone()])
            .await
            .unwrap();

        let mut resubmitted = mixer;
        resubmitted.id = Some(first.ids[0]);
        let second = repo
            .save_products(Some(faucets), &[resubmitted])
            .await
            .unwrap();

        assert!(second.is_noop());
        assert_eq!(second.unchanged, first.ids);
        let products = repo.list_products(None).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].category_id, Some(faucets));
    }

    #[tokio::test]
    async fn test_scoped_filter_resubmit_is_noop() {
        let db = setup_db().await;
        let repo = repo(&db);
        let (faucets, sinks) = seed_categories(&db).await;

        let mut size = filter("Size", 0);
        size.category_id = Some(sinks);
        let first = repo.save_filters(Some(faucets), &[size.clone()]).await.unwrap();

        size.id = Some(first.ids[0]);
        let second = repo.save_filters(Some(faucets), &[size]).await.unwrap();

        assert!(second.is_noop());
        assert_eq!(repo.list_filters(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unscoped_save_keeps_item_categories() {
        let db = setup_db().await;
        let repo = repo(&db);
        let (faucets, _) = seed_categories(&db).await;

        repo.save_products(
            None,
            &[
                CatalogProduct::new("Mixer", "M-1", 100).with_category(faucets),
                CatalogProduct::new("Loose", "L-1", 10),
            ],
        )
        .await
        .unwrap();

        let products = repo.list_products(None).await.unwrap();
        assert_eq!(products[0].category_id, Some(faucets));
        assert_eq!(products[1].category_id, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_scoped_product_save_is_idempotent(
            items in prop::collection::vec((0usize..3, "[a-z]{1,8}", 0i64..10_000), 0..6)
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let db = setup_db().await;
                let repo = repo(&db);
                let (faucets, sinks) = seed_categories(&db).await;
                let categories = [None, Some(faucets), Some(sinks)];

                let desired: Vec<CatalogProduct> = items
                    .iter()
                    .map(|(category, name, price)| {
                        let mut product = CatalogProduct::new(name.clone(), format!("A-{}", name), *price);
                        product.category_id = categories[*category];
                        product
                    })
                    .collect();

                let first = repo.save_products(Some(faucets), &desired).await.unwrap();
                let resubmitted: Vec<CatalogProduct> = desired
                    .into_iter()
                    .zip(&first.ids)
                    .map(|(mut product, id)| {
                        product.id = Some(*id);
                        product
                    })
                    .collect();
                let before = repo.list_products(Some(faucets)).await.unwrap();

                let second = repo.save_products(Some(faucets), &resubmitted).await.unwrap();

                assert!(second.is_noop(), "{:?}", second);
                assert_eq!(repo.list_products(Some(faucets)).await.unwrap(), before);
                assert_eq!(repo.list_products(None).await.unwrap().len(), resubmitted.len());
            });
        }
    }
}
