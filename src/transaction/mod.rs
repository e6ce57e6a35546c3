//! One-time expenses and incomes.
//!
//! Both kinds share one table and one set of route handlers, parameterised by
//! their [crate::recurrence::CategoryPolicy].

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Expense, Income, OneTimeTransaction, TransactionForm, TransactionId, TransactionState,
    create_transaction, create_transaction_table, delete_transaction, get_transactions,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub(crate) use core::NewTransaction;
