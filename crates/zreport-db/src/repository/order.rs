//! # Order Repository
//!
//! Read access to POS orders for the hourly sales histogram, plus the
//! writes needed to record them (products, orders, lines).
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderQuery::Sessions(ids)        OrderQuery::Range { start, end, .. }  │
//! │          │                                   │                          │
//! │          └──────────────┬────────────────────┘                          │
//! │                         ▼                                               │
//! │  pos_orders  (state IN paid/done/invoiced)                              │
//! │     LEFT JOIN pos_order_lines                                           │
//! │     + GROUP_CONCAT(product_categories.category_id) per line             │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  one row per line ──fold──► Vec<Order> with lines and category ids      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are stored as Unix epoch milliseconds (UTC) so range filters
//! compare integers.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use zreport_core::filter::OrderQuery;
use zreport_core::error::ValidationError;
use zreport_core::{Money, Order, OrderLine, OrderState};

/// One order line joined with its order header.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: String,
    config_id: String,
    session_id: String,
    state: OrderState,
    date_order_ms: i64,
    product_id: Option<String>,
    product_name: Option<String>,
    qty: Option<f64>,
    price_subtotal_cents: Option<i64>,
    /// Comma-separated category ids of the line's product.
    category_ids: Option<String>,
}

impl OrderLineRow {
    fn header(&self) -> DbResult<Order> {
        let date_order = DateTime::<Utc>::from_timestamp_millis(self.date_order_ms).ok_or_else(|| {
            DbError::Internal(format!(
                "order {} has an out-of-range timestamp: {}",
                self.order_id, self.date_order_ms
            ))
        })?;

        Ok(Order {
            id: self.order_id.clone(),
            config_id: self.config_id.clone(),
            session_id: self.session_id.clone(),
            state: self.state,
            date_order,
            lines: Vec::new(),
        })
    }

    /// The line part, absent for an order without lines.
    fn into_line(self) -> Option<OrderLine> {
        let product_id = self.product_id?;

        Some(OrderLine {
            product_id,
            product_name: self.product_name.unwrap_or_default(),
            qty: self.qty.unwrap_or_default(),
            price_subtotal: Money::from_cents(self.price_subtotal_cents.unwrap_or_default()),
            category_ids: self
                .category_ids
                .map(|ids| {
                    ids.split(',')
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates a product linked to `category_ids`.
    ///
    /// ## Returns
    /// * `Ok(String)` - The new product id
    /// * `Err(DbError::ForeignKeyViolation)` - A category id doesn't exist
    pub async fn create_product(&self, name: &str, category_ids: &[&str]) -> DbResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }
        let id = Uuid::new_v4().to_string();

        debug!(id = %id, name = %name, categories = category_ids.len(), "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO products (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&id)
            .bind(name)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        for category_id in category_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO product_categories (product_id, category_id) VALUES (?1, ?2)",
            )
            .bind(&id)
            .bind(*category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Inserts an order and its lines in one transaction.
    ///
    /// `OrderLine::category_ids` is not stored: categories are read back
    /// from the product when the order is loaded.
    ///
    /// ## Returns
    /// * `Ok(())` - Order stored
    /// * `Err(DbError::UniqueViolation)` - Order id already used
    /// * `Err(DbError::ForeignKeyViolation)` - A line's product doesn't exist
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, state = ?order.state, lines = order.lines.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pos_orders (id, config_id, session_id, state, date_order_ms)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.config_id)
        .bind(&order.session_id)
        .bind(order.state)
        .bind(order.date_order.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        for (sequence, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO pos_order_lines (
                    id, order_id, sequence, product_id, product_name, qty, price_subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order.id)
            .bind(sequence as i64)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.qty)
            .bind(line.price_subtotal.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads the reported orders (paid, done, invoiced) selected by `query`,
    /// oldest first, with their lines and each line's product categories.
    pub async fn find(&self, query: &OrderQuery) -> DbResult<Vec<Order>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                o.id AS order_id,
                o.config_id,
                o.session_id,
                o.state,
                o.date_order_ms,
                l.product_id,
                l.product_name,
                l.qty,
                l.price_subtotal_cents,
                (
                    SELECT GROUP_CONCAT(pc.category_id)
                    FROM product_categories pc
                    WHERE pc.product_id = l.product_id
                ) AS category_ids
            FROM pos_orders o
            LEFT JOIN pos_order_lines l ON l.order_id = o.id
            WHERE o.state IN ("#,
        );

        let mut states = builder.separated(", ");
        for state in OrderState::REPORTED {
            states.push_bind(state);
        }
        states.push_unseparated(")");

        match query {
            OrderQuery::Sessions(session_ids) => {
                builder.push(" AND o.session_id IN (");
                let mut ids = builder.separated(", ");
                for id in session_ids {
                    ids.push_bind(id.clone());
                }
                ids.push_unseparated(")");
            }
            OrderQuery::Range {
                start,
                end,
                config_ids,
            } => {
                builder
                    .push(" AND o.date_order_ms >= ")
                    .push_bind(start.timestamp_millis())
                    .push(" AND o.date_order_ms < ")
                    .push_bind(end.timestamp_millis());

                if !config_ids.is_empty() {
                    builder.push(" AND o.config_id IN (");
                    let mut ids = builder.separated(", ");
                    for id in config_ids {
                        ids.push_bind(id.clone());
                    }
                    ids.push_unseparated(")");
                }
            }
        }

        builder.push(" ORDER BY o.date_order_ms, o.id, l.sequence");

        let rows: Vec<OrderLineRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        let mut orders: Vec<Order> = Vec::new();
        for row in rows {
            let same_order = orders.last().is_some_and(|order| order.id == row.order_id);
            if !same_order {
                orders.push(row.header()?);
            }
            if let (Some(order), Some(line)) = (orders.last_mut(), row.into_line()) {
                order.lines.push(line);
            }
        }

        debug!(count = orders.len(), "Loaded orders for report");
        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
