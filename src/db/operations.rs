use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::db::models::{normalize_first_name, Customer, Reservation, TopCustomer};
use crate::error::AppError;
use crate::Result;

/// How many customers `best_customers` ranks.
pub const TOP_CUSTOMERS_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct CustomerRepository {
    pool: Arc<PgPool>,
}

impl CustomerRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// All customers, ordered by last name and then first name.
    pub async fn list_all(&self) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, phone, notes
            FROM customers
            ORDER BY last_name, first_name, id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Customer> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name, phone, notes FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such customer: {}", id)))
    }

    /// Customers whose first name matches `name` once it is capitalized.
    ///
    /// No match is an empty result, not an error. A blank `name` is rejected
    /// before the database is touched.
    pub async fn find_by_first_name(&self, name: &str) -> Result<Vec<Customer>> {
        let name = normalize_first_name(name)?;

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, phone, notes
            FROM customers
            WHERE first_name = $1
            ORDER BY last_name, id
            "#,
        )
        .bind(&name)
        .fetch_all(self.pool.as_ref())
        .await?;

        debug!(first_name = %name, count = customers.len(), "Searched customers by first name");
        Ok(customers)
    }

    /// Customers with the most reservations, busiest first.
    ///
    /// Equal counts are ordered by id. Customers without reservations never
    /// appear, so an empty table yields an empty list.
    pub async fn top_customers(&self, limit: i64) -> Result<Vec<TopCustomer>> {
        if limit < 1 {
            return Err(AppError::ValidationError(format!(
                "limit must be at least 1, got {}",
                limit
            )));
        }

        let customers = sqlx::query_as::<_, TopCustomer>(
            r#"
            SELECT c.id, c.first_name, c.last_name, c.phone, c.notes,
                   COUNT(r.id) AS reservation_count
            FROM customers AS c
            JOIN reservations AS r ON r.customer_id = c.id
            GROUP BY c.id
            ORDER BY reservation_count DESC, c.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(customers)
    }

    pub async fn best_customers(&self) -> Result<Vec<TopCustomer>> {
        self.top_customers(TOP_CUSTOMERS_LIMIT).await
    }

    /// Insert a new customer or overwrite an existing one.
    ///
    /// Inserting assigns the generated id to `customer`. Updates are
    /// last-write-wins; updating an id with no row is `NotFound`.
    pub async fn save(&self, customer: &mut Customer) -> Result<()> {
        match customer.id() {
            None => {
                let id: i32 = sqlx::query_scalar(
                    r#"
                    INSERT INTO customers (first_name, last_name, phone, notes)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.phone)
                .bind(&customer.notes)
                .fetch_one(self.pool.as_ref())
                .await?;

                customer.assign_id(id);
                debug!(customer_id = id, "Inserted customer");
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE customers
                    SET first_name = $1, last_name = $2, phone = $3, notes = $4
                    WHERE id = $5
                    "#,
                )
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.phone)
                .bind(&customer.notes)
                .bind(id)
                .execute(self.pool.as_ref())
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("No such customer: {}", id)));
                }
                debug!(customer_id = id, "Updated customer");
            }
        }

        Ok(())
    }
}

/// Where a customer's reservations come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationSource: Send + Sync {
    async fn reservations_for_customer(&self, customer_id: i32) -> Result<Vec<Reservation>>;
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: Arc<PgPool>,
}

impl ReservationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, customer_id, num_guests, start_at, notes
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such reservation: {}", id)))
    }

    pub async fn save(&self, reservation: &mut Reservation) -> Result<()> {
        reservation.validate()?;

        match reservation.id() {
            None => {
                let id: i32 = sqlx::query_scalar(
                    r#"
                    INSERT INTO reservations (customer_id, start_at, num_guests, notes)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(reservation.customer_id)
                .bind(reservation.start_at)
                .bind(reservation.num_guests)
                .bind(&reservation.notes)
                .fetch_one(self.pool.as_ref())
                .await?;

                reservation.assign_id(id);
                debug!(reservation_id = id, customer_id = reservation.customer_id, "Inserted reservation");
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE reservations
                    SET start_at = $1, num_guests = $2, notes = $3
                    WHERE id = $4
                    "#,
                )
                .bind(reservation.start_at)
                .bind(reservation.num_guests)
                .bind(&reservation.notes)
                .bind(id)
                .execute(self.pool.as_ref())
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("No such reservation: {}", id)));
                }
                debug!(reservation_id = id, "Updated reservation");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ReservationSource for ReservationRepository {
    async fn reservations_for_customer(&self, customer_id: i32) -> Result<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, customer_id, num_guests, start_at, notes
            FROM reservations
            WHERE customer_id = $1
            ORDER BY start_at, id
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(reservations)
    }
}
