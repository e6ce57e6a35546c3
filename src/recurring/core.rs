//! Defines the request forms and database queries for recurring expenses and
//! incomes.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserID,
    amount::Amount,
    recurrence::{CategoryPolicy, Interval, RecurrenceRule, RecurrenceRuleId},
    validation::{parse_amount, parse_date, parse_description},
};

// ============================================================================
// MODELS
// ============================================================================

/// The fields of a recurring transaction as sent by a client.
///
/// Used both for creating a rule, where every field except `isActive` is
/// required, and for editing one, where every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringForm {
    /// A text description, e.g. "Rent".
    pub description: Option<String>,
    /// The amount of each occurrence.
    pub amount: Option<f64>,
    /// The category, required for expenses and ignored for incomes.
    pub category: Option<String>,
    /// The date of the first occurrence, e.g. "2024-01-31".
    pub start_date: Option<String>,
    /// One of "Weekly", "Monthly" or "Annually".
    pub interval: Option<String>,
    /// Whether the rule counts towards totals, defaults to `true` for new rules.
    pub is_active: Option<bool>,
}

/// The validated fields of a new recurring transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurrenceRule<C> {
    /// A non-empty description.
    pub description: String,
    /// A finite, non-negative amount.
    pub amount: Amount,
    /// The category slot.
    pub category: C,
    /// The date of the first occurrence.
    pub start_date: Date,
    /// How often the rule repeats.
    pub interval: Interval,
    /// Whether the rule counts towards totals.
    pub is_active: bool,
}

/// The validated fields to change on an existing recurring transaction.
///
/// Fields that are `None` are left as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRuleUpdate<C> {
    /// The new description.
    pub description: Option<String>,
    /// The new amount.
    pub amount: Option<Amount>,
    /// The new category.
    pub category: Option<C>,
    /// The new start date.
    pub start_date: Option<Date>,
    /// The new interval.
    pub interval: Option<Interval>,
    /// The new active flag.
    pub is_active: Option<bool>,
}

impl RecurringForm {
    /// Check every field and convert the form into a [NewRecurrenceRule].
    ///
    /// # Errors
    ///
    /// Returns the error for the first field that is missing or invalid.
    pub fn validate_new<C: CategoryPolicy>(self) -> Result<NewRecurrenceRule<C>, Error> {
        let description = self
            .description
            .ok_or(Error::MissingField("description"))?;
        let amount = self.amount.ok_or(Error::MissingField("amount"))?;
        let start_date = self.start_date.ok_or(Error::MissingField("startDate"))?;
        let interval = self.interval.ok_or(Error::MissingField("interval"))?;

        Ok(NewRecurrenceRule {
            description: parse_description(&description)?,
            amount: parse_amount(amount)?,
            category: C::from_input(self.category)?,
            start_date: parse_date(&start_date)?,
            interval: Interval::from_str(&interval)?,
            is_active: self.is_active.unwrap_or(true),
        })
    }

    /// Check the fields that are present and convert the form into a
    /// [RecurrenceRuleUpdate].
    ///
    /// # Errors
    ///
    /// Returns the error for the first field that is invalid.
    pub fn validate_update<C: CategoryPolicy>(self) -> Result<RecurrenceRuleUpdate<C>, Error> {
        Ok(RecurrenceRuleUpdate {
            description: self
                .description
                .as_deref()
                .map(parse_description)
                .transpose()?,
            amount: self.amount.map(parse_amount).transpose()?,
            category: match self.category {
                Some(category) => Some(C::from_input(Some(category))?),
                None => None,
            },
            start_date: self.start_date.as_deref().map(parse_date).transpose()?,
            interval: self
                .interval
                .as_deref()
                .map(Interval::from_str)
                .transpose()?,
            is_active: self.is_active,
        })
    }
}

/// The body of a request that switches a recurring transaction on or off.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleForm {
    /// Whether the rule should count towards totals.
    pub is_active: Option<bool>,
}

/// The state needed by the recurring transaction endpoints.
#[derive(Debug, Clone)]
pub struct RecurringState {
    /// The canonical name of the server's timezone, used to get today's date.
    pub local_timezone: String,
    /// The database connection for managing recurring transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

impl ToSql for Interval {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Interval {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            Interval::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
        })
    }
}

const RULE_COLUMNS: &str = "id, user_id, description, amount, category, start_date, interval, \
    is_active, created_at, updated_at";

/// Create the table for recurring expenses and incomes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_recurring_transaction_table(
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                category TEXT,
                start_date TEXT NOT NULL,
                interval TEXT NOT NULL CHECK (interval IN ('Weekly', 'Monthly', 'Annually')),
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_recurring_transaction_owner_kind
            ON recurring_transaction(user_id, kind);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a recurrence rule.
pub fn map_recurring_row<C: CategoryPolicy>(
    row: &Row,
) -> Result<RecurrenceRule<C>, rusqlite::Error> {
    let raw_amount: f64 = row.get(3)?;
    let raw_category: Option<String> = row.get(4)?;

    Ok(RecurrenceRule {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        amount: Amount::new_unchecked(raw_amount),
        category: C::from_stored(raw_category),
        start_date: row.get(5)?,
        interval: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Create a new recurring transaction owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_recurrence_rule<C: CategoryPolicy>(
    user_id: UserID,
    new_rule: NewRecurrenceRule<C>,
    connection: &Connection,
) -> Result<RecurrenceRule<C>, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO recurring_transaction
                (user_id, kind, description, amount, category, start_date, interval, is_active,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             RETURNING {RULE_COLUMNS}"
        ))?
        .query_one(
            (
                user_id.as_i64(),
                C::KIND.as_str(),
                &new_rule.description,
                new_rule.amount.as_f64(),
                new_rule.category.as_category(),
                new_rule.start_date,
                new_rule.interval,
                new_rule.is_active,
                now,
            ),
            map_recurring_row,
        )
        .map_err(Error::from)
}

/// Get the recurring transactions of kind `C` owned by `user_id`, most
/// recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_recurrence_rules<C: CategoryPolicy>(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecurrenceRule<C>>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM recurring_transaction
             WHERE user_id = ?1 AND kind = ?2
             ORDER BY created_at DESC, id DESC"
        ))?
        .query_map((user_id.as_i64(), C::KIND.as_str()), map_recurring_row)?
        .map(|maybe_rule| maybe_rule.map_err(Error::from))
        .collect()
}

/// Get the recurring transaction `id` of kind `C` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a recurring transaction of
///   kind `C` owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_recurrence_rule<C: CategoryPolicy>(
    id: RecurrenceRuleId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RecurrenceRule<C>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM recurring_transaction
             WHERE id = ?1 AND user_id = ?2 AND kind = ?3"
        ))?
        .query_one((id, user_id.as_i64(), C::KIND.as_str()), map_recurring_row)
        .map_err(Error::from)
}

/// Change the fields of the recurring transaction `id` that are set in
/// `update`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a recurring transaction of
///   kind `C` owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_recurrence_rule<C: CategoryPolicy>(
    id: RecurrenceRuleId,
    user_id: UserID,
    update: RecurrenceRuleUpdate<C>,
    connection: &Connection,
) -> Result<RecurrenceRule<C>, Error> {
    connection
        .prepare(&format!(
            "UPDATE recurring_transaction
             SET description = COALESCE(?1, description),
                 amount = COALESCE(?2, amount),
                 category = COALESCE(?3, category),
                 start_date = COALESCE(?4, start_date),
                 interval = COALESCE(?5, interval),
                 is_active = COALESCE(?6, is_active),
                 updated_at = ?7
             WHERE id = ?8 AND user_id = ?9 AND kind = ?10
             RETURNING {RULE_COLUMNS}"
        ))?
        .query_one(
            (
                update.description.as_deref(),
                update.amount.map(|amount| amount.as_f64()),
                update
                    .category
                    .as_ref()
                    .and_then(|category| category.as_category()),
                update.start_date,
                update.interval,
                update.is_active,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
                C::KIND.as_str(),
            ),
            map_recurring_row,
        )
        .map_err(Error::from)
}

/// Switch the recurring transaction `id` on or off.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a recurring transaction of
///   kind `C` owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_recurrence_rule_active<C: CategoryPolicy>(
    id: RecurrenceRuleId,
    user_id: UserID,
    is_active: bool,
    connection: &Connection,
) -> Result<RecurrenceRule<C>, Error> {
    connection
        .prepare(&format!(
            "UPDATE recurring_transaction SET is_active = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND kind = ?5
             RETURNING {RULE_COLUMNS}"
        ))?
        .query_one(
            (
                is_active,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
                C::KIND.as_str(),
            ),
            map_recurring_row,
        )
        .map_err(Error::from)
}

/// Delete the recurring transaction `id` of kind `C` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a recurring transaction of
///   kind `C` owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_recurrence_rule<C: CategoryPolicy>(
    id: RecurrenceRuleId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM recurring_transaction WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
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


#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        amount::Amount,
        recurrence::{Category, HasCategory, Interval, NoCategory, RecurringExpense},
        recurring::{
            NewRecurrenceRule, RecurrenceRuleUpdate, create_recurrence_rule,
            delete_recurrence_rule, get_recurrence_rule, get_recurrence_rules,
            set_recurrence_rule_active, update_recurrence_rule,
        },
        test_utils::{get_test_connection_with_user, insert_test_user},
    };

    fn rent() -> NewRecurrenceRule<HasCategory> {
        NewRecurrenceRule {
            description: "Rent".to_owned(),
            amount: Amount::new(500.0).unwrap(),
            category: HasCategory(Category::new("Housing").unwrap()),
            start_date: date!(2024 - 01 - 31),
            interval: Interval::Monthly,
            is_active: true,
        }
    }

    fn no_changes() -> RecurrenceRuleUpdate<HasCategory> {
        RecurrenceRuleUpdate {
            description: None,
            amount: None,
            category: None,
            start_date: None,
            interval: None,
            is_active: None,
        }
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection_with_user();

        let rule = create_recurrence_rule(user_id, rent(), &conn).unwrap();

        assert!(rule.id > 0);
        assert_eq!(rule.user_id, user_id);
        assert_eq!(rule.interval, Interval::Monthly);
        assert_eq!(rule.start_date, date!(2024 - 01 - 31));
        assert!(rule.is_active);
        assert_eq!(get_recurrence_rule::<HasCategory>(rule.id, user_id, &conn), Ok(rule));
    }

    #[test]
    fn list_is_newest_first_and_separated_by_kind() {
        let (conn, user_id) = get_test_connection_with_user();
        let first = create_recurrence_rule(user_id, rent(), &conn).unwrap();
        let second = create_recurrence_rule(user_id, rent(), &conn).unwrap();

        let rules: Vec<RecurringExpense> = get_recurrence_rules(user_id, &conn).unwrap();

        let ids: Vec<i64> = rules.iter().map(|rule| rule.id).collect();
        assert_eq!(ids, [second.id, first.id]);
        assert_eq!(get_recurrence_rules::<NoCategory>(user_id, &conn), Ok(vec![]));
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let (conn, user_id) = get_test_connection_with_user();
        let rule = create_recurrence_rule(user_id, rent(), &conn).unwrap();

        let updated = update_recurrence_rule(
            rule.id,
            user_id,
            RecurrenceRuleUpdate {
                amount: Some(Amount::new(550.0).unwrap()),
                interval: Some(Interval::Weekly),
                ..no_changes()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.amount.as_f64(), 550.0);
        assert_eq!(updated.interval, Interval::Weekly);
        assert_eq!(updated.description, rule.description);
        assert_eq!(updated.category, rule.category);
        assert_eq!(updated.start_date, rule.start_date);
        assert_eq!(updated.created_at, rule.created_at);
    }

    #[test]
    fn set_active_toggles_rule() {
        let (conn, user_id) = get_test_connection_with_user();
        let rule = create_recurrence_rule(user_id, rent(), &conn).unwrap();

        let paused = set_recurrence_rule_active::<HasCategory>(rule.id, user_id, false, &conn)
            .unwrap();
        assert!(!paused.is_active);

        let resumed = set_recurrence_rule_active::<HasCategory>(rule.id, user_id, true, &conn)
            .unwrap();
        assert!(resumed.is_active);
    }

    #[test]
    fn other_users_cannot_change_rules() {
        let (conn, owner) = get_test_connection_with_user();
        let intruder = insert_test_user(&conn, "intruder@example.com");
        let rule = create_recurrence_rule(owner, rent(), &conn).unwrap();

        assert_eq!(
            get_recurrence_rule::<HasCategory>(rule.id, intruder, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            update_recurrence_rule(rule.id, intruder, no_changes(), &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            set_recurrence_rule_active::<HasCategory>(rule.id, intruder, false, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_recurrence_rule::<HasCategory>(rule.id, intruder, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_removes_rule() {
        let (conn, user_id) = get_test_connection_with_user();
        let rule = create_recurrence_rule(user_id, rent(), &conn).unwrap();

        delete_recurrence_rule::<HasCategory>(rule.id, user_id, &conn).unwrap();

        assert_eq!(
            get_recurrence_rule::<HasCategory>(rule.id, user_id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn interval_check_constraint_rejects_unknown_literals() {
        let (conn, user_id) = get_test_connection_with_user();

        let result = conn.execute(
            "INSERT INTO recurring_transaction
                (user_id, kind, description, amount, start_date, interval, created_at, updated_at)
             VALUES (?1, 'income', 'Salary', 1.0, '2024-01-01', 'Daily', '', '')",
            (user_id.as_i64(),),
        );

        assert!(result.is_err());
    }
}
