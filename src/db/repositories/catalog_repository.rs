use sqlx::types::Uuid;
use sqlx::PgPool;

use crate::db::models::{CategoryType, Service};

/// Lookups into the externally-managed service taxonomy.
pub struct CatalogRepository;

impl CatalogRepository {
    pub async fn find_category_type(
        pool: &PgPool,
        category_type_id: Uuid,
    ) -> Result<Option<CategoryType>, sqlx::Error> {
        sqlx::query_as::<_, CategoryType>(
            "SELECT id, name, slug, created_at FROM category_types WHERE id = $1",
        )
        .bind(category_type_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_service(
        pool: &PgPool,
        service_id: Uuid,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            "SELECT id, owner_id, category_id, title, animal_types, is_active, created_at, updated_at
             FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_optional(pool)
        .await
    }

    /// The owner's active service ids whose category belongs to the given
    /// category type. This is the taxonomy walk behind every conflict check:
    /// category type -> categories -> the owner's services.
    pub async fn service_ids_for_category_type(
        pool: &PgPool,
        owner_id: Uuid,
        category_type_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT s.id
            FROM services s
            JOIN service_categories c ON c.id = s.category_id
            WHERE s.owner_id = $1 AND c.category_type_id = $2 AND s.is_active
            "#,
        )
        .bind(owner_id)
        .bind(category_type_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
