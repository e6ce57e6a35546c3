//! The monthly summary of a user's expenses and incomes.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::Month;

use crate::{
    AppState, Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::{
        HasCategory, MonthlyBreakdown, NoCategory, RecurringExpense, RecurringIncome,
        breakdown_for_month, last_day_of_month,
    },
    recurring::get_recurrence_rules,
    timezone::local_today,
    transaction::{Expense, Income, get_transactions},
    validation::{MonthQuery, month_bounds},
};

/// The state needed to summarise a month.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The canonical name of the server's timezone, used to get the current month.
    pub local_timezone: String,
    /// The database connection for loading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Totals formatted to two decimal places for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisplay {
    /// The total expenses.
    pub expenses: String,
    /// The total incomes.
    pub incomes: String,
    /// Incomes minus expenses.
    pub net: String,
    /// The total expenses divided by the days in the month.
    pub average_daily_expense: String,
    /// The total incomes divided by the days in the month.
    pub average_daily_income: String,
}

/// The expenses and incomes of a single month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// The zero-based month, 0 is January.
    pub month: u8,
    /// The calendar year.
    pub year: i32,
    /// The number of days in the month.
    pub days_in_month: u8,
    /// The one-time and recurring expenses.
    pub expenses: MonthlyBreakdown,
    /// The one-time and recurring incomes.
    pub incomes: MonthlyBreakdown,
    /// Incomes minus expenses.
    pub net: f64,
    /// The total expenses divided by the days in the month.
    pub average_daily_expense: f64,
    /// The total incomes divided by the days in the month.
    pub average_daily_income: f64,
    /// The totals formatted for display.
    pub display: SummaryDisplay,
}

/// Summarise the expenses and incomes of `month` in `year`.
///
/// `expenses` and `incomes` are the one-time transactions dated in the month.
/// Every rule is given; inactive ones are skipped.
///
/// # Errors
///
/// Returns [Error::Projection] if a rule cannot be projected onto the month.
pub fn summarise_month(
    expenses: &[Expense],
    incomes: &[Income],
    recurring_expenses: &[RecurringExpense],
    recurring_incomes: &[RecurringIncome],
    month: Month,
    year: i32,
) -> Result<MonthlySummary, Error> {
    let expenses = breakdown_for_month(
        expenses.iter().map(|expense| expense.amount.as_f64()),
        recurring_expenses,
        month,
        year,
    )?;
    let incomes = breakdown_for_month(
        incomes.iter().map(|income| income.amount.as_f64()),
        recurring_incomes,
        month,
        year,
    )?;

    let days_in_month = last_day_of_month(year, month);
    let net = incomes.total - expenses.total;
    let average_daily_expense = expenses.total / f64::from(days_in_month);
    let average_daily_income = incomes.total / f64::from(days_in_month);

    Ok(MonthlySummary {
        month: u8::from(month) - 1,
        year,
        days_in_month,
        display: SummaryDisplay {
            expenses: format!("{:.2}", expenses.total),
            incomes: format!("{:.2}", incomes.total),
            net: format!("{net:.2}"),
            average_daily_expense: format!("{average_daily_expense:.2}"),
            average_daily_income: format!("{average_daily_income:.2}"),
        },
        expenses,
        incomes,
        net,
        average_daily_expense,
        average_daily_income,
    })
}

/// A route handler for the monthly summary of the caller's transactions.
///
/// The month is given by the zero-based `month` and `year` query parameters and
/// defaults to the current month in the server's timezone.
///
/// # Errors
///
/// Responds with 400 Bad Request if only one of `month` and `year` is given or
/// the month is out of range.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlySummary>, Error> {
    let (month, year) = match query.selected_month()? {
        Some(selected) => selected,
        None => {
            let today = local_today(&state.local_timezone)?;
            (today.month(), today.year())
        }
    };
    let date_range = month_bounds(month, year)?;

    let connection = lock_connection(&state.db_connection)?;
    let expenses = get_transactions::<HasCategory>(user.id, Some(date_range), &connection)?;
    let incomes = get_transactions::<NoCategory>(user.id, Some(date_range), &connection)?;
    let recurring_expenses = get_recurrence_rules::<HasCategory>(user.id, &connection)?;
    let recurring_incomes = get_recurrence_rules::<NoCategory>(user.id, &connection)?;
    drop(connection);

    summarise_month(
        &expenses,
        &incomes,
        &recurring_expenses,
        &recurring_incomes,
        month,
        year,
    )
    .map(Json)
}

#[cfg(test)]
mod summarise_month_tests {
    use time::{Month, macros::date};

    use crate::{
        recurrence::{Interval, NoCategory, RecurringIncome, test_rules::expense_rule},
        summary::summarise_month,
    };

    fn salary(amount: f64, is_active: bool) -> RecurringIncome {
        let rule = expense_rule(amount, Interval::Monthly, date!(2024 - 01 - 01));

        RecurringIncome {
            id: rule.id + 100,
            user_id: rule.user_id,
            description: "Salary".to_owned(),
            amount: rule.amount,
            category: NoCategory,
            start_date: rule.start_date,
            interval: rule.interval,
            is_active,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }

    #[test]
    fn weekly_expense_and_monthly_income() {
        let recurring_expenses = [expense_rule(50.0, Interval::Weekly, date!(2024 - 01 - 01))];
        let recurring_incomes = [salary(3100.0, true)];

        let summary = summarise_month(
            &[],
            &[],
            &recurring_expenses,
            &recurring_incomes,
            Month::January,
            2024,
        )
        .unwrap();

        assert_eq!(summary.month, 0);
        assert_eq!(summary.days_in_month, 31);
        assert_eq!(summary.expenses.total, 250.0);
        assert_eq!(summary.expenses.recurring_breakdown.weekly, 250.0);
        assert_eq!(summary.incomes.total, 3100.0);
        assert_eq!(summary.net, 2850.0);
        assert_eq!(summary.average_daily_income, 100.0);
        assert_eq!(summary.display.net, "2850.00");
        assert_eq!(summary.display.average_daily_expense, "8.06");
    }

    #[test]
    fn inactive_income_is_ignored() {
        let recurring_incomes = [salary(3100.0, false)];

        let summary =
            summarise_month(&[], &[], &[], &recurring_incomes, Month::February, 2024).unwrap();

        assert_eq!(summary.days_in_month, 29);
        assert_eq!(summary.incomes.total, 0.0);
        assert_eq!(summary.incomes.active_recurring_count, 0);
        assert_eq!(summary.display.incomes, "0.00");
    }
}
