//! Defines the core data models and database queries for one-time expenses and
//! incomes.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserID,
    amount::Amount,
    recurrence::{
        CategoryPolicy, HasCategory, NoCategory, category_is_absent, serialize_category,
    },
    timezone::rfc3339,
    validation::{parse_amount, parse_date, parse_description},
};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// An expense or income that happened once, on a single date.
///
/// The category slot `C` is [HasCategory] for expenses and [NoCategory] for
/// incomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = "C: CategoryPolicy"))]
pub struct OneTimeTransaction<C> {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    #[serde(skip)]
    pub user_id: UserID,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// The category of expenses, absent for incomes.
    #[serde(
        serialize_with = "serialize_category",
        skip_serializing_if = "category_is_absent"
    )]
    pub category: C,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was created.
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// An expense that happened once.
pub type Expense = OneTimeTransaction<HasCategory>;

/// An income that happened once.
pub type Income = OneTimeTransaction<NoCategory>;

/// The fields of a transaction as sent by a client.
///
/// Creating and editing both take every field. Nothing is validated until
/// [TransactionForm::validate] is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// The amount of money spent or earned.
    pub amount: Option<f64>,
    /// The category, required for expenses and ignored for incomes.
    pub category: Option<String>,
    /// When the transaction happened, e.g. "2024-01-15".
    pub date: Option<String>,
}

/// The validated fields of a transaction, ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction<C> {
    /// A non-empty description.
    pub description: String,
    /// A finite, non-negative amount.
    pub amount: Amount,
    /// The category slot.
    pub category: C,
    /// When the transaction happened.
    pub date: Date,
}

impl TransactionForm {
    /// Check every field and convert the form into a [NewTransaction].
    ///
    /// # Errors
    ///
    /// Returns the error for the first field that is missing or invalid.
    pub fn validate<C: CategoryPolicy>(self) -> Result<NewTransaction<C>, Error> {
        let description = self
            .description
            .ok_or(Error::MissingField("description"))?;
        let amount = self.amount.ok_or(Error::MissingField("amount"))?;
        let date = self.date.ok_or(Error::MissingField("date"))?;

        Ok(NewTransaction {
            description: parse_description(&description)?,
            amount: parse_amount(amount)?,
            category: C::from_input(self.category)?,
            date: parse_date(&date)?,
        })
    }
}

/// The state needed by the one-time transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, user_id, description, amount, category, date, created_at, updated_at";

/// Create the table for one-time expenses and incomes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                category TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the monthly listing and summary queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_kind_date
            ON \"transaction\"(user_id, kind, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a transaction.
pub fn map_transaction_row<C: CategoryPolicy>(
    row: &Row,
) -> Result<OneTimeTransaction<C>, rusqlite::Error> {
    let raw_amount: f64 = row.get(3)?;
    let raw_category: Option<String> = row.get(4)?;

    Ok(OneTimeTransaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        amount: Amount::new_unchecked(raw_amount),
        category: C::from_stored(raw_category),
        date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `user_id` is not a registered user.
pub fn create_transaction<C: CategoryPolicy>(
    user_id: UserID,
    new_transaction: NewTransaction<C>,
    connection: &Connection,
) -> Result<OneTimeTransaction<C>, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\"
                (user_id, kind, description, amount, category, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_one(
            (
                user_id.as_i64(),
                C::KIND.as_str(),
                &new_transaction.description,
                new_transaction.amount.as_f64(),
                new_transaction.category.as_category(),
                new_transaction.date,
                now,
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Get the transactions of kind `C` owned by `user_id`, newest first.
///
/// If `date_range` is given, only transactions dated within the inclusive
/// range are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions<C: CategoryPolicy>(
    user_id: UserID,
    date_range: Option<(Date, Date)>,
    connection: &Connection,
) -> Result<Vec<OneTimeTransaction<C>>, Error> {
    let (start, end) = date_range.unwrap_or((Date::MIN, Date::MAX));

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1 AND kind = ?2 AND date BETWEEN ?3 AND ?4
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            (user_id.as_i64(), C::KIND.as_str(), start, end),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace every field of the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of kind `C`
///   owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction<C: CategoryPolicy>(
    id: TransactionId,
    user_id: UserID,
    update: NewTransaction<C>,
    connection: &Connection,
) -> Result<OneTimeTransaction<C>, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET description = ?1, amount = ?2, category = ?3, date = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7 AND kind = ?8
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_one(
            (
                &update.description,
                update.amount.as_f64(),
                update.category.as_category(),
                update.date,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
                C::KIND.as_str(),
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Delete the transaction `id` of kind `C` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of kind `C`
///   owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction<C: CategoryPolicy>(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
        (id, user_id.as_i64(), C::KIND.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
