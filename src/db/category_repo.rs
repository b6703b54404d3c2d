use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::reconcile::{self, Bound, Child, Record, ReconcileReport, Scope, Table};
use super::{from_json, parse_timestamp, to_json, StoreError};
use crate::models::{persisted_id, Category, SubCategory};

// sub_categories.category_id has no ON DELETE CASCADE.
pub(crate) const CATEGORIES: Table = Table {
    name: "categories",
    columns: &["name", "images"],
    timestamps: true,
    children: &[Child {
        table: "sub_categories",
        foreign_key: "category_id",
    }],
};

pub(crate) const SUB_CATEGORIES: Table = Table {
    name: "sub_categories",
    columns: &["name", "href"],
    timestamps: false,
    children: &[],
};

/// How the subcategories of a saved category are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubcategoryPolicy {
    /// Reconcile by id like any other collection; ids survive a save.
    #[default]
    Upsert,
    /// Delete every subcategory of the category and insert the list again.
    /// Subcategory ids change on every save.
    ReplaceAll,
}

impl fmt::Display for SubcategoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubcategoryPolicy::Upsert => write!(f, "upsert"),
            SubcategoryPolicy::ReplaceAll => write!(f, "replace-all"),
        }
    }
}

impl FromStr for SubcategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upsert" => Ok(SubcategoryPolicy::Upsert),
            "replace-all" => Ok(SubcategoryPolicy::ReplaceAll),
            _ => Err(format!(
                "Invalid subcategory policy '{}'. Valid options: upsert, replace-all",
                s
            )),
        }
    }
}

impl Record for Category {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query.bind(&self.name).bind(to_json(&self.images))
    }
}

impl Record for SubCategory {
    fn id(&self) -> Option<i64> {
        persisted_id(self.id)
    }

    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q> {
        query.bind(&self.name).bind(&self.href)
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    images: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct SubCategoryRow {
    id: i64,
    name: String,
    href: String,
    category_id: Option<i64>,
}

impl From<SubCategoryRow> for SubCategory {
    fn from(row: SubCategoryRow) -> Self {
        SubCategory {
            id: Some(row.id),
            name: row.name,
            href: row.href,
            category_id: row.category_id,
        }
    }
}

/// Deletes all subcategories of one category and inserts `desired` fresh.
async fn replace_sub_categories(
    conn: &mut SqliteConnection,
    category_id: i64,
    desired: &[SubCategory],
) -> Result<ReconcileReport, sqlx::Error> {
    let scope = Scope::new("category_id", category_id);
    let mut report = ReconcileReport::default();

    let mut existing: Vec<i64> = reconcile::snapshot(conn, &SUB_CATEGORIES, Some(scope))
        .await?
        .into_iter()
        .collect();
    existing.sort_unstable();
    for id in existing {
        reconcile::delete_row(conn, &SUB_CATEGORIES, id).await?;
        report.deleted.push(id);
    }

    for sub_category in desired {
        let id =
            reconcile::insert_row(conn, &SUB_CATEGORIES, None, Some(scope), sub_category).await?;
        report.inserted.push(id);
        report.ids.push(id);
    }

    Ok(report)
}

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All categories with their subcategories, in id order.
    pub async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> = sqlx::query_as("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let sub_rows: Vec<SubCategoryRow> =
            sqlx::query_as("SELECT * FROM sub_categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let mut by_parent: HashMap<i64, Vec<SubCategory>> = HashMap::new();
        for row in sub_rows {
            if let Some(parent) = row.category_id {
                by_parent.entry(parent).or_default().push(row.into());
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: Some(row.id),
                name: row.name,
                images: from_json(&row.images),
                sub_categories: by_parent.remove(&row.id).unwrap_or_default(),
                created_at: Some(parse_timestamp(&row.created_at)),
                updated_at: Some(parse_timestamp(&row.updated_at)),
            })
            .collect())
    }

    /// Makes the category tree match `categories`.
    ///
    /// New categories are inserted before their subcategories so the children
    /// can reference the assigned id. Categories missing from the list are
    /// deleted together with their subcategories.
    pub async fn save(
        &self,
        categories: &[Category],
        policy: SubcategoryPolicy,
    ) -> Result<ReconcileReport, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut report = reconcile::reconcile(&mut tx, &CATEGORIES, None, categories).await?;

        let ids = report.ids.clone();
        for (category, category_id) in categories.iter().zip(ids) {
            let children = match policy {
                SubcategoryPolicy::Upsert => {
                    reconcile::reconcile(
                        &mut tx,
                        &SUB_CATEGORIES,
                        Some(Scope::new("category_id", category_id)),
                        &category.sub_categories,
                    )
                    .await?
                }
                SubcategoryPolicy::ReplaceAll => {
                    replace_sub_categories(&mut tx, category_id, &category.sub_categories).await?
                }
            };
            report.absorb(children);
        }

        tx.commit().await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{setup_db, TestDb};

    fn repo(db: &TestDb) -> CategoryRepository {
        CategoryRepository::new(db.pool.clone())
    }

    async fn seed_faucets(repo: &CategoryRepository) -> Category {
        repo.save(
            &[Category::new("Faucets").with_sub_categories(vec![
                SubCategory::new("A", "/catalog/faucets/a"),
                SubCategory::new("B", "/catalog/faucets/b"),
            ])],
            SubcategoryPolicy::Upsert,
        )
        .await
        .unwrap();
        repo.list().await.unwrap().remove(0)
    }

    fn names(category: &Category) -> Vec<&str> {
        category
            .sub_categories
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    async fn sub_category_count(db: &TestDb) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sub_categories")
            .fetch_one(&db.pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            SubcategoryPolicy::from_str("replace-all").unwrap(),
            SubcategoryPolicy::ReplaceAll
        );
        assert_eq!(
            SubcategoryPolicy::from_str("UPSERT").unwrap(),
            SubcategoryPolicy::Upsert
        );
        assert!(SubcategoryPolicy::from_str("merge").is_err());
    }

    #[tokio::test]
    async fn test_new_category_with_sub_categories() {
        let db = setup_db().await;
        let faucets = seed_faucets(&repo(&db)).await;

        assert_eq!(faucets.name, "Faucets");
        assert_eq!(names(&faucets), vec!["A", "B"]);
        assert!(faucets
            .sub_categories
            .iter()
            .all(|s| s.category_id == faucets.id));
    }

    #[tokio::test]
    async fn test_upsert_preserves_surviving_sub_category_id() {
        let db = setup_db().await;
        let repo = repo(&db);
        let mut faucets = seed_faucets(&repo).await;
        let b = faucets.sub_categories[1].clone();

        faucets.sub_categories = vec![b.clone(), SubCategory::new("C", "/catalog/faucets/c")];
        repo.save(&[faucets], SubcategoryPolicy::Upsert)
            .await
            .unwrap();

        let saved = repo.list().await.unwrap().remove(0);
        assert_eq!(names(&saved), vec!["B", "C"]);
        assert_eq!(saved.sub_categories[0].id, b.id);
        assert_eq!(sub_category_count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_replace_all_reinserts_sub_categories() {
        let db = setup_db().await;
        let repo = repo(&db);
        let mut faucets = seed_faucets(&repo).await;
        let b = faucets.sub_categories[1].clone();

        faucets.sub_categories = vec![b.clone(), SubCategory::new("C", "/catalog/faucets/c")];
        let report = repo
            .save(&[faucets], SubcategoryPolicy::ReplaceAll)
            .await
            .unwrap();

        let saved = repo.list().await.unwrap().remove(0);
        assert_eq!(names(&saved), vec!["B", "C"]);
        assert_ne!(saved.sub_categories[0].id, b.id);
        assert_eq!(report.deleted.len(), 2);
        assert_eq!(report.inserted.len(), 2);
        assert_eq!(sub_category_count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_removed_category_takes_sub_categories_with_it() {
        let db = setup_db().await;
        let repo = repo(&db);
        seed_faucets(&repo).await;

        repo.save(
            &[Category::new("Sinks")
                .with_sub_categories(vec![SubCategory::new("Countertop", "/catalog/sinks/top")])],
            SubcategoryPolicy::Upsert,
        )
        .await
        .unwrap();

        let categories = repo.list().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Sinks");
        assert_eq!(sub_category_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_invalid_sub_category_rolls_back_whole_tree() {
        let db = setup_db().await;
        let repo = repo(&db);
        let faucets = seed_faucets(&repo).await;
        let before = repo.list().await.unwrap();

        let mut renamed = faucets.clone();
        renamed.name = "Mixers".into();
        renamed.sub_categories.push(SubCategory::new("", "/broken"));

        let result = repo
            .save(
                &[renamed, Category::new("Showers")],
                SubcategoryPolicy::Upsert,
            )
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(repo.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_resubmitting_tree_is_noop() {
        let db = setup_db().await;
        let repo = repo(&db);
        seed_faucets(&repo).await;
        let before = repo.list().await.unwrap();

        let report = repo
            .save(&before, SubcategoryPolicy::Upsert)
            .await
            .unwrap();

        assert!(report.is_noop());
        assert_eq!(repo.list().await.unwrap(), before);
    }
}
