use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::db::operations::ReservationSource;
use crate::error::AppError;
use crate::Result;

/// A restaurant patron.
///
/// Fields map one-to-one onto the `customers` columns; callers see them in
/// camelCase (`firstName`, `lastName`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl Customer {
    /// A customer that has not been saved yet.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone,
            notes,
        }
    }

    /// Store-assigned identifier, `None` until the first save.
    pub fn id(&self) -> Option<i32> {
        self.id
    }

    // Only the insert path calls this, and only while `id` is still unset.
    pub(crate) fn assign_id(&mut self, id: i32) {
        debug_assert!(self.id.is_none(), "customer id is already assigned");
        self.id = Some(id);
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Reservations belonging to this customer.
    ///
    /// An unsaved customer cannot own reservations, so the source is not
    /// consulted in that case.
    pub async fn reservations<S>(&self, source: &S) -> Result<Vec<Reservation>>
    where
        S: ReservationSource + ?Sized,
    {
        match self.id {
            Some(id) => source.reservations_for_customer(id).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Canonical spelling used for first-name lookups: "jOHN" becomes "John".
pub fn normalize_first_name(name: &str) -> Result<String> {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => Ok(first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()),
        None => Err(AppError::ValidationError(
            "first name must not be empty".to_string(),
        )),
    }
}

/// A customer ranked by how many reservations they have made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    #[serde(flatten)]
    pub customer: Customer,
    pub reservation_count: i64,
}

impl<'r> FromRow<'r, PgRow> for TopCustomer {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            customer: Customer::from_row(row)?,
            reservation_count: row.try_get("reservation_count")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    id: Option<i32>,
    pub customer_id: i32,
    pub num_guests: i32,
    pub start_at: NaiveDateTime,
    pub notes: Option<String>,
}

impl Reservation {
    pub fn new(
        customer_id: i32,
        num_guests: i32,
        start_at: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<Self> {
        let reservation = Self {
            id: None,
            customer_id,
            num_guests,
            start_at,
            notes,
        };
        reservation.validate()?;
        Ok(reservation)
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: i32) {
        debug_assert!(self.id.is_none(), "reservation id is already assigned");
        self.id = Some(id);
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_guests < 1 {
            return Err(AppError::ValidationError(format!(
                "a reservation needs at least one guest, got {}",
                self.num_guests
            )));
        }
        Ok(())
    }

    /// Start time as shown to staff, e.g. "March 7 2024, 6:30 pm".
    pub fn formatted_start_at(&self) -> String {
        self.start_at.format("%B %-d %Y, %-I:%M %P").to_string()
    }
}
