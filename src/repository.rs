use crate::models::{
    Banner, BannerChanges, BannerView, NewBanner, NewProducto, NewService, NewUser, Producto,
    ProductoChanges, ProductoView, PublicUser, Service, ServiceChanges, ServiceView,
    UpdateUserRequest, User,
};
use crate::pagination::{
    BANNER_SEARCH, ListQuery, PRODUCTO_SEARCH, PageEnvelope, SERVICE_SEARCH, SearchFields,
    USER_SEARCH, push_search_filter,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

// Column lists shared between the page executor and the single-row queries.
const BANNER_COLUMNS: &str =
    "id, title, description, image, price, background, user_id, created_at, updated_at";
const PRODUCTO_COLUMNS: &str =
    "id, description, image, price, stock, user_id, created_at, updated_at";
const SERVICE_COLUMNS: &str = "id, title, description, image, price, user_id, created_at, updated_at";
// The public projection: no password hash, ever.
const USER_COLUMNS: &str = "id, username, email, is_active, created_at, updated_at";

/// Repository Trait
///
/// Abstract contract for all persistence operations, shared as an
/// `Arc<dyn Repository>` so handlers never depend on the concrete backend.
/// Every method surfaces its database failure; the handlers map those to the
/// HTTP error taxonomy instead of letting raw errors escape.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Banners ---
    async fn list_banners(&self) -> Result<Vec<Banner>, sqlx::Error>;
    async fn paginate_banners(&self, query: &ListQuery)
    -> Result<PageEnvelope<Banner>, sqlx::Error>;
    async fn get_banner(&self, id: Uuid) -> Result<Option<BannerView>, sqlx::Error>;
    // Full record, used by update to reach the currently stored image.
    async fn find_banner(&self, id: Uuid) -> Result<Option<Banner>, sqlx::Error>;
    async fn create_banner(&self, banner: NewBanner) -> Result<Banner, sqlx::Error>;
    async fn update_banner(
        &self,
        id: Uuid,
        changes: BannerChanges,
        owner: Uuid,
    ) -> Result<Option<Banner>, sqlx::Error>;

    // --- Productos ---
    async fn list_productos(&self) -> Result<Vec<Producto>, sqlx::Error>;
    async fn paginate_productos(
        &self,
        query: &ListQuery,
    ) -> Result<PageEnvelope<Producto>, sqlx::Error>;
    async fn get_producto(&self, id: Uuid) -> Result<Option<ProductoView>, sqlx::Error>;
    async fn find_producto(&self, id: Uuid) -> Result<Option<Producto>, sqlx::Error>;
    async fn create_producto(&self, producto: NewProducto) -> Result<Producto, sqlx::Error>;
    async fn update_producto(
        &self,
        id: Uuid,
        changes: ProductoChanges,
        owner: Uuid,
    ) -> Result<Option<Producto>, sqlx::Error>;
    // Returns the deleted row so the handler can release its image.
    async fn delete_producto(&self, id: Uuid) -> Result<Option<Producto>, sqlx::Error>;

    // --- Services ---
    async fn list_services(&self) -> Result<Vec<Service>, sqlx::Error>;
    async fn paginate_services(
        &self,
        query: &ListQuery,
    ) -> Result<PageEnvelope<Service>, sqlx::Error>;
    async fn get_service(&self, id: Uuid) -> Result<Option<ServiceView>, sqlx::Error>;
    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, sqlx::Error>;
    async fn create_service(&self, service: NewService) -> Result<Service, sqlx::Error>;
    async fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
        owner: Uuid,
    ) -> Result<Option<Service>, sqlx::Error>;
    async fn delete_service(&self, id: Uuid) -> Result<Option<Service>, sqlx::Error>;

    // --- Users ---
    async fn paginate_users(&self, query: &ListQuery)
    -> Result<PageEnvelope<PublicUser>, sqlx::Error>;
    // Full row including the password hash; auth and login only.
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    // Uniqueness probe that ignores the row being updated.
    async fn username_taken_by_other(&self, username: &str, id: Uuid)
    -> Result<bool, sqlx::Error>;
    async fn get_public_user(&self, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error>;
    async fn create_user(&self, user: NewUser) -> Result<PublicUser, sqlx::Error>;
    async fn update_user(
        &self,
        id: Uuid,
        changes: &UpdateUserRequest,
    ) -> Result<Option<PublicUser>, sqlx::Error>;
    async fn toggle_user_active(&self, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error>;
    async fn set_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool, sqlx::Error>;
}

/// The concrete type used to share the persistence layer across the app state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of [`Repository`] backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The single paginated-query executor every resource listing goes through.
///
/// Applies the search predicate twice, once for the unsliced `COUNT(*)` and
/// once for the page slice, with the fixed newest-first sort. Requesting a
/// page past the end yields an empty slice and an envelope whose flags are
/// still derived from the real totals.
async fn fetch_page<T>(
    pool: &PgPool,
    table: &str,
    columns: &str,
    fields: &SearchFields,
    query: &ListQuery,
) -> Result<PageEnvelope<T>, sqlx::Error>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table));
    push_search_filter(&mut count_builder, fields, query.search.as_deref());
    let total_docs: i64 = count_builder
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM {}", columns, table));
    push_search_filter(&mut builder, fields, query.search.as_deref());
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset());

    let data = builder.build_query_as::<T>().fetch_all(pool).await?;

    Ok(PageEnvelope::new(data, total_docs, query))
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Banners ---

    async fn list_banners(&self) -> Result<Vec<Banner>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(&format!(
            "SELECT {} FROM banners ORDER BY created_at DESC",
            BANNER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn paginate_banners(
        &self,
        query: &ListQuery,
    ) -> Result<PageEnvelope<Banner>, sqlx::Error> {
        fetch_page(&self.pool, "banners", BANNER_COLUMNS, &BANNER_SEARCH, query).await
    }

    async fn get_banner(&self, id: Uuid) -> Result<Option<BannerView>, sqlx::Error> {
        sqlx::query_as::<_, BannerView>(
            "SELECT id, title, description, price, background, image FROM banners WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_banner(&self, id: Uuid) -> Result<Option<Banner>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(&format!(
            "SELECT {} FROM banners WHERE id = $1",
            BANNER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_banner(&self, banner: NewBanner) -> Result<Banner, sqlx::Error> {
        sqlx::query_as::<_, Banner>(&format!(
            r#"
            INSERT INTO banners (id, title, description, image, price, background, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, '#F7F6F2'), $7, NOW(), NOW())
            RETURNING {}
            "#,
            BANNER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(banner.title)
        .bind(banner.description)
        .bind(banner.image)
        .bind(banner.price)
        .bind(banner.background)
        .bind(banner.user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Overwrites the text fields, keeps the stored image unless a new one
    /// was uploaded, and backfills the owner for rows that predate ownership.
    async fn update_banner(
        &self,
        id: Uuid,
        changes: BannerChanges,
        owner: Uuid,
    ) -> Result<Option<Banner>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(&format!(
            r#"
            UPDATE banners
            SET title = $2,
                description = $3,
                price = $4,
                background = COALESCE($5, background),
                image = COALESCE($6, image),
                user_id = COALESCE(user_id, $7),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BANNER_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.background)
        .bind(changes.image)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Productos ---

    async fn list_productos(&self) -> Result<Vec<Producto>, sqlx::Error> {
        sqlx::query_as::<_, Producto>(&format!(
            "SELECT {} FROM productos ORDER BY created_at DESC",
            PRODUCTO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn paginate_productos(
        &self,
        query: &ListQuery,
    ) -> Result<PageEnvelope<Producto>, sqlx::Error> {
        fetch_page(
            &self.pool,
            "productos",
            PRODUCTO_COLUMNS,
            &PRODUCTO_SEARCH,
            query,
        )
        .await
    }

    async fn get_producto(&self, id: Uuid) -> Result<Option<ProductoView>, sqlx::Error> {
        sqlx::query_as::<_, ProductoView>(
            "SELECT id, description, price, image FROM productos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_producto(&self, id: Uuid) -> Result<Option<Producto>, sqlx::Error> {
        sqlx::query_as::<_, Producto>(&format!(
            "SELECT {} FROM productos WHERE id = $1",
            PRODUCTO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_producto(&self, producto: NewProducto) -> Result<Producto, sqlx::Error> {
        sqlx::query_as::<_, Producto>(&format!(
            r#"
            INSERT INTO productos (id, description, image, price, stock, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {}
            "#,
            PRODUCTO_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(producto.description)
        .bind(producto.image)
        .bind(producto.price)
        .bind(producto.stock)
        .bind(producto.user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_producto(
        &self,
        id: Uuid,
        changes: ProductoChanges,
        owner: Uuid,
    ) -> Result<Option<Producto>, sqlx::Error> {
        sqlx::query_as::<_, Producto>(&format!(
            r#"
            UPDATE productos
            SET description = $2,
                price = $3,
                stock = $4,
                image = COALESCE($5, image),
                user_id = COALESCE(user_id, $6),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCTO_COLUMNS
        ))
        .bind(id)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.image)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_producto(&self, id: Uuid) -> Result<Option<Producto>, sqlx::Error> {
        sqlx::query_as::<_, Producto>(&format!(
            "DELETE FROM productos WHERE id = $1 RETURNING {}",
            PRODUCTO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Services ---

    async fn list_services(&self) -> Result<Vec<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {} FROM services ORDER BY created_at DESC",
            SERVICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn paginate_services(
        &self,
        query: &ListQuery,
    ) -> Result<PageEnvelope<Service>, sqlx::Error> {
        fetch_page(
            &self.pool,
            "services",
            SERVICE_COLUMNS,
            &SERVICE_SEARCH,
            query,
        )
        .await
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<ServiceView>, sqlx::Error> {
        sqlx::query_as::<_, ServiceView>(
            "SELECT id, title, description, price, image FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_service(&self, service: NewService) -> Result<Service, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (id, title, description, image, price, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(service.title)
        .bind(service.description)
        .bind(service.image)
        .bind(service.price)
        .bind(service.user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
        owner: Uuid,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET title = $2,
                description = $3,
                price = $4,
                image = COALESCE($5, image),
                user_id = COALESCE(user_id, $6),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.image)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_service(&self, id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            "DELETE FROM services WHERE id = $1 RETURNING {}",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Users ---

    /// Paginated user listing. The projection never includes the password
    /// hash regardless of search parameters.
    async fn paginate_users(
        &self,
        query: &ListQuery,
    ) -> Result<PageEnvelope<PublicUser>, sqlx::Error> {
        fetch_page(&self.pool, "users", USER_COLUMNS, &USER_SEARCH, query).await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, created_at, updated_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn username_taken_by_other(
        &self,
        username: &str,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
        )
        .bind(username)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_public_user(&self, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, user: NewUser) -> Result<PublicUser, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, true, NOW(), NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user(
        &self,
        id: Uuid,
        changes: &UpdateUserRequest,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
    }

    /// Flips the soft-delete flag in a single statement and returns the
    /// updated record.
    async fn toggle_user_active(&self, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(&format!(
            r#"
            UPDATE users
            SET is_active = NOT is_active, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_user_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
