//! Route handlers that project recurring transactions onto future dates.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::{
        CategoryPolicy, MAX_MONTHS_AHEAD, Occurrence, RecurrenceRuleId, next_occurrences,
        project_for_window,
    },
    recurring::{RecurringState, get_recurrence_rule, get_recurrence_rules},
    timezone::local_today,
};

/// How many upcoming dates to list when the client does not ask for a number.
pub const DEFAULT_NEXT_COUNT: usize = 3;

/// The most upcoming dates a client can ask for at once.
pub const MAX_NEXT_COUNT: usize = 100;

/// How many months to preview when the client does not ask for a number.
pub const DEFAULT_PREVIEW_MONTHS: u32 = 12;

/// The query string of a request for upcoming dates.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NextQuery {
    /// How many dates to list.
    pub count: Option<usize>,
}

/// The upcoming dates of one recurring transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOccurrencesResponse {
    /// The ID of the recurring transaction.
    pub rule_id: RecurrenceRuleId,
    /// The upcoming dates, in ascending order, all after today.
    pub dates: Vec<Date>,
}

/// A route handler for listing the next dates a recurring transaction occurs
/// on, starting after today's date in the server's timezone.
///
/// The count is capped at [MAX_NEXT_COUNT]. The dates are listed whether or not
/// the rule is active.
///
/// # Errors
///
/// Responds with 404 Not Found if the rule does not exist or belongs to another
/// user.
pub async fn next_occurrences_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
    Path(rule_id): Path<RecurrenceRuleId>,
    Query(query): Query<NextQuery>,
) -> Result<Json<NextOccurrencesResponse>, Error> {
    let count = query.count.unwrap_or(DEFAULT_NEXT_COUNT).min(MAX_NEXT_COUNT);
    let today = local_today(&state.local_timezone)?;

    let rule = {
        let connection = lock_connection(&state.db_connection)?;
        get_recurrence_rule::<C>(rule_id, user.id, &connection)?
    };

    let dates = next_occurrences(&rule, count, today)?;

    Ok(Json(NextOccurrencesResponse { rule_id, dates }))
}

/// The query string of a request for a preview of future occurrences.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PreviewQuery {
    /// How many months ahead of today to preview.
    pub months: Option<u32>,
}

/// A route handler for previewing every occurrence of the caller's active
/// recurring expenses or incomes over the next few months.
///
/// The occurrences of all rules are merged and sorted by date, then by rule and
/// position. The number of months is capped at [MAX_MONTHS_AHEAD].
pub async fn preview_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<Vec<Occurrence>>, Error> {
    let months = query
        .months
        .unwrap_or(DEFAULT_PREVIEW_MONTHS)
        .min(MAX_MONTHS_AHEAD);
    let today = local_today(&state.local_timezone)?;

    let rules = {
        let connection = lock_connection(&state.db_connection)?;
        get_recurrence_rules::<C>(user.id, &connection)?
    };

    let mut occurrences = Vec::new();

    for rule in rules.iter().filter(|rule| rule.is_active) {
        occurrences.extend(project_for_window(rule, months, today)?);
    }

    occurrences.sort_by_key(|occurrence| {
        (occurrence.date, occurrence.rule_id, occurrence.position)
    });

    Ok(Json(occurrences))
}
