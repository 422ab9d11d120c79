//! Repository for the `orders` table.

use coursely_core::payments::OrderStatus;
use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::order::{CreateOrder, Order, OrderListQuery};

const COLUMNS: &str = "id, user_id, course_id, seller_id, currency, amount, status, tx_ref, \
                       code, gateway_reference, paid_at, created_at, updated_at";

/// Provides persistence for course orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert an order, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders
                (user_id, course_id, seller_id, currency, amount, status, tx_ref, code, paid_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(input.user_id)
            .bind(input.course_id)
            .bind(input.seller_id)
            .bind(&input.currency)
            .bind(input.amount)
            .bind(input.status.as_str())
            .bind(&input.tx_ref)
            .bind(&input.code)
            .bind(input.paid_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the order a gateway transaction reference belongs to.
    pub async fn find_by_tx_ref(pool: &PgPool, tx_ref: &str) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE tx_ref = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(tx_ref)
            .fetch_optional(pool)
            .await
    }

    /// A buyer's orders, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Offline sales recorded by a seller, newest first.
    pub async fn list_by_seller(
        pool: &PgPool,
        seller_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE seller_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(seller_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All orders for the manager, optionally filtered by status and course.
    pub async fn list(
        pool: &PgPool,
        params: &OrderListQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR course_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(&params.status)
            .bind(params.course_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Whether the user currently has a paid order for the course.
    pub async fn has_paid(pool: &PgPool, user_id: DbId, course_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM orders WHERE user_id = $1 AND course_id = $2 AND status = 'paid'
             )",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Compare-and-set the order status.
    ///
    /// The row is only updated while it still has status `from`; `None`
    /// means another writer moved it first. Moving to `paid` stamps
    /// `paid_at` once.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: OrderStatus,
        to: OrderStatus,
        gateway_reference: Option<&str>,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                status = $3::TEXT,
                gateway_reference = COALESCE($4, gateway_reference),
                paid_at = CASE WHEN $3::TEXT = 'paid' THEN COALESCE(paid_at, NOW()) ELSE paid_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(gateway_reference)
            .fetch_optional(pool)
            .await
    }
}
