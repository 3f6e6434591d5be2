//! `PostgreSQL` commerce backend.
//!
//! Uniqueness of `(user_id, product_id)` rows is enforced by the schema
//! (see `migrations/`); upserts lean on `ON CONFLICT` rather than
//! check-then-write.

use sqlx::PgPool;

use orchard_core::{OrderId, ProductId, UserId};

use crate::commerce::backend::{
    CartRow, CommerceBackend, NewOrder, OrderRow, ProductRow, WishlistRow,
};

use super::RepositoryError;

/// Postgres-backed [`CommerceBackend`].
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Create a backend over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map constraint violations to `Conflict`, everything else to `Database`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(db_err.message().to_owned());
    }
    RepositoryError::Database(e)
}

impl CommerceBackend for PgBackend {
    async fn product_rows(&self) -> Result<Vec<ProductRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image_path
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn cart_rows(&self, user: UserId) -> Result<Vec<CartRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(
            r"
            SELECT c.product_id, p.name, p.price, p.image_path, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_cart_item(
        &self,
        user: UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            ",
        )
        .bind(user)
        .bind(product)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn delete_cart_item(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<(), RepositoryError> {
        // Deleting an absent row is a no-op by contract; rows_affected is
        // deliberately not checked.
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user)
            .bind(product)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn wishlist_rows(&self, user: UserId) -> Result<Vec<WishlistRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.product_id, p.name, p.price, p.image_path
            FROM wishlist w
            JOIN products p ON p.id = w.product_id
            WHERE w.user_id = $1
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn is_wishlisted(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<bool, RepositoryError> {
        let present = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM wishlist WHERE user_id = $1 AND product_id = $2)",
        )
        .bind(user)
        .bind(product)
        .fetch_one(&self.pool)
        .await?;

        Ok(present)
    }

    async fn insert_wishlist_entry(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO wishlist (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user)
        .bind(product)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn delete_wishlist_entry(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
            .bind(user)
            .bind(product)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn order_rows(&self, user: UserId) -> Result<Vec<OrderRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, items, total, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_order(
        &self,
        user: UserId,
        order: NewOrder,
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (user_id, items, total)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user)
        .bind(&order.items)
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order_id)
    }
}
