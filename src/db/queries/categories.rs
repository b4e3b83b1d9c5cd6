use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

/// Folds categories into the `id -> type` map the API hands out.
pub fn categories_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Type label of a category, `None` when the id is unknown.
pub async fn get_category_type(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT type FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_category(pool: &SqlitePool, id: i64, kind: &str) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
        "#,
    )
    .bind(id)
    .bind(kind)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn update_category(pool: &SqlitePool, category: Category) -> sqlx::Result<()> {
    get_category(pool, category.id).await?;
    sqlx::query(
        r#"
        UPDATE categories SET type=?1 WHERE categories.id = ?2
        "#,
    )
    .bind(category.kind)
    .bind(category.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();
    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Makes the table match `categories`: missing ids are deleted, known ids updated, new ids inserted.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_categories(pool)
        .await?
        .iter()
        .map(|c| c.id)
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_category(pool, *id).await?;
    }
    for category in categories {
        if existing_ids.contains(&category.id) {
            update_category(pool, category).await?;
        } else {
            create_category(pool, category.id, &category.kind).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn category_type_lookup() {
        let pool = test_pool().await;
        assert_eq!(
            get_category_type(&pool, 3).await.unwrap().as_deref(),
            Some("Geography")
        );
        assert_eq!(get_category_type(&pool, 99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn map_is_keyed_by_id() {
        let pool = test_pool().await;
        let map = categories_map(get_all_categories(&pool).await.unwrap());
        assert_eq!(map.len(), 6);
        assert_eq!(map[&1], "Science");
        assert_eq!(map[&6], "Sports");
        assert_eq!(
            serde_json::to_value(&map).unwrap()["2"],
            serde_json::json!("Art")
        );
    }

    #[tokio::test]
    async fn import_synchronises_table() {
        let pool = test_pool().await;
        import_categories(
            &pool,
            vec![
                Category {
                    id: 1,
                    kind: "Physics".to_owned(),
                },
                Category {
                    id: 7,
                    kind: "Music".to_owned(),
                },
            ],
        )
        .await
        .unwrap();

        let categories = get_all_categories(&pool).await.unwrap();
        assert_eq!(
            categories,
            vec![
                Category {
                    id: 1,
                    kind: "Physics".to_owned()
                },
                Category {
                    id: 7,
                    kind: "Music".to_owned()
                },
            ]
        );
    }

    #[tokio::test]
    async fn deleting_unknown_category_is_row_not_found() {
        let pool = test_pool().await;
        assert!(matches!(
            delete_category(&pool, 42).await,
            Err(sqlx::Error::RowNotFound)
        ));
    }
}
