use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query_as, FromRow, QueryBuilder};
use uuid::Uuid;

use crate::{
    application::{
        dto::photo_dto::{NewPhoto, PhotoUpdate},
        error::ApplicationError,
        repositories::photo_repository::PhotoRepository,
    },
    domain::models::photo::Photo,
};

/// Base select joining each photo to its aggregated category names.
const PHOTO_SELECT: &str = r#"
    SELECT p.id, p.title, p.url, p.thumbnail_url, p.storage_provider,
           p.storage_key, p.thumbnail_key, p.width, p.height, p.size,
           p.is_featured, p.created_at,
           COALESCE(ARRAY_REMOVE(ARRAY_AGG(c.name ORDER BY c.name), NULL), '{}') AS categories
    FROM photos p
    LEFT JOIN photo_categories pc ON pc.photo_id = p.id
    LEFT JOIN categories c ON c.id = pc.category_id
"#;

#[derive(Debug, FromRow)]
struct PhotoRow {
    id: Uuid,
    title: String,
    url: String,
    thumbnail_url: Option<String>,
    storage_provider: String,
    storage_key: String,
    thumbnail_key: Option<String>,
    width: i32,
    height: i32,
    size: i64,
    is_featured: bool,
    created_at: DateTime<Utc>,
    categories: Vec<String>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Photo {
            id: row.id,
            title: row.title,
            url: row.url,
            thumbnail_url: row.thumbnail_url,
            storage_provider: row.storage_provider,
            storage_key: row.storage_key,
            thumbnail_key: row.thumbnail_key,
            width: row.width,
            height: row.height,
            size: row.size,
            is_featured: row.is_featured,
            created_at: row.created_at,
            categories: row.categories,
        }
    }
}

pub struct PgPhotoRepository {
    pool: sqlx::PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, ApplicationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        let id = Uuid::new_v4();
        let insert = r#"
            INSERT INTO photos (
                id, title, url, thumbnail_url, storage_provider,
                storage_key, thumbnail_key, width, height, size,
                is_featured, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, NOW())
        "#;

        sqlx::query(insert)
            .bind(id)
            .bind(&photo.title)
            .bind(&photo.url)
            .bind(&photo.thumbnail_url)
            .bind(&photo.storage_provider)
            .bind(&photo.storage_key)
            .bind(&photo.thumbnail_key)
            .bind(photo.width)
            .bind(photo.height)
            .bind(photo.size)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        // Connect-or-create each category, then link it.
        for name in &photo.categories {
            let link = r#"
                WITH ins AS (
                    INSERT INTO categories (id, name)
                    VALUES ($1, $2)
                    ON CONFLICT (name) DO NOTHING
                    RETURNING id
                )
                INSERT INTO photo_categories (photo_id, category_id)
                SELECT $3, COALESCE(
                    (SELECT id FROM ins),
                    (SELECT id FROM categories WHERE name = $2)
                )
            "#;
            sqlx::query(link)
                .bind(Uuid::new_v4())
                .bind(name)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        self.get_photo(id).await?.ok_or_else(|| {
            ApplicationError::DatabaseError("Created photo vanished before read-back".to_string())
        })
    }

    async fn get_photo(&self, id: Uuid) -> Result<Option<Photo>, ApplicationError> {
        let query = format!("{} WHERE p.id = $1 GROUP BY p.id", PHOTO_SELECT);

        let row: Option<PhotoRow> = query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn list_photos(
        &self,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Photo>, ApplicationError> {
        let mut builder = QueryBuilder::new(PHOTO_SELECT);

        if let Some(category) = category {
            builder.push(
                " WHERE p.id IN (
                    SELECT pc2.photo_id FROM photo_categories pc2
                    JOIN categories c2 ON c2.id = pc2.category_id
                    WHERE c2.name = ",
            );
            builder.push_bind(category);
            builder.push(")");
        }

        builder.push(" GROUP BY p.id ORDER BY p.created_at DESC");

        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let rows: Vec<PhotoRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Photo>, ApplicationError> {
        let query = format!(
            "{} WHERE p.is_featured GROUP BY p.id ORDER BY p.created_at DESC LIMIT $1",
            PHOTO_SELECT
        );

        let rows: Vec<PhotoRow> = query_as(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_photo(&self, id: Uuid, update: PhotoUpdate) -> Result<Photo, ApplicationError> {
        if !update.is_empty() {
            let mut builder = QueryBuilder::new("UPDATE photos SET ");
            let mut separated = builder.separated(", ");

            if let Some(title) = &update.title {
                separated.push("title = ");
                separated.push_bind_unseparated(title);
            }
            if let Some(is_featured) = update.is_featured {
                separated.push("is_featured = ");
                separated.push_bind_unseparated(is_featured);
            }

            builder.push(" WHERE id = ");
            builder.push_bind(id);
            builder.push(" RETURNING id");

            let updated: Option<(Uuid,)> = builder
                .build_query_as()
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

            if updated.is_none() {
                return Err(ApplicationError::NotFound);
            }
        }

        self.get_photo(id).await?.ok_or(ApplicationError::NotFound)
    }

    async fn delete_photo(&self, id: Uuid) -> Result<(), ApplicationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM photo_categories WHERE photo_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<String>, ApplicationError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
