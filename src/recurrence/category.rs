//! The category slot shared by expenses and incomes.
//!
//! Expenses always carry a category and incomes never do. Rather than
//! duplicating every type and handler, transactions are generic over a
//! [CategoryPolicy] that decides what the slot holds.

use std::fmt::Display;

use serde::{Serialize, Serializer};

use crate::Error;

/// Whether money is going out or coming in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money going out.
    Expense,
    /// Money coming in.
    Income,
}

impl TransactionKind {
    /// The value stored in the `kind` column of the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides what the category slot of a transaction holds.
pub trait CategoryPolicy: Sized + Clone + std::fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The kind of transaction that uses this policy.
    const KIND: TransactionKind;

    /// Validate the category supplied by a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy requires a category and `category` is
    /// missing or blank.
    fn from_input(category: Option<String>) -> Result<Self, Error>;

    /// Rebuild the slot from a value that was validated before it was stored.
    fn from_stored(category: Option<String>) -> Self;

    /// The category text, if the slot holds one.
    fn as_category(&self) -> Option<&str>;
}

/// A non-empty, trimmed category name, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategory] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_owned()))
        }
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The category slot of an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct HasCategory(pub Category);

impl CategoryPolicy for HasCategory {
    const KIND: TransactionKind = TransactionKind::Expense;

    fn from_input(category: Option<String>) -> Result<Self, Error> {
        match category {
            Some(category) => Category::new(&category).map(HasCategory),
            None => Err(Error::MissingField("category")),
        }
    }

    fn from_stored(category: Option<String>) -> Self {
        HasCategory(Category(category.unwrap_or_default()))
    }

    fn as_category(&self) -> Option<&str> {
        Some(self.0.as_ref())
    }
}

/// The category slot of an income, which never holds a category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoCategory;

impl CategoryPolicy for NoCategory {
    const KIND: TransactionKind = TransactionKind::Income;

    /// Incomes have no category, so anything the client sends is dropped.
    fn from_input(_category: Option<String>) -> Result<Self, Error> {
        Ok(NoCategory)
    }

    fn from_stored(_category: Option<String>) -> Self {
        NoCategory
    }

    fn as_category(&self) -> Option<&str> {
        None
    }
}

/// Serialize a category slot as its text, or `null` if it has none.
pub(crate) fn serialize_category<C, S>(category: &C, serializer: S) -> Result<S::Ok, S::Error>
where
    C: CategoryPolicy,
    S: Serializer,
{
    category.as_category().serialize(serializer)
}

/// Used to omit the category field of incomes when serializing.
pub(crate) fn category_is_absent<C: CategoryPolicy>(category: &C) -> bool {
    category.as_category().is_none()
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        recurrence::{Category, CategoryPolicy, HasCategory, NoCategory, TransactionKind},
    };

    #[test]
    fn category_is_trimmed() {
        let category = Category::new("  Groceries ").unwrap();

        assert_eq!(category.as_ref(), "Groceries");
    }

    #[test]
    fn blank_category_is_rejected() {
        assert_eq!(Category::new(""), Err(Error::EmptyCategory));
        assert_eq!(Category::new(" \t "), Err(Error::EmptyCategory));
    }

    #[test]
    fn expenses_require_a_category() {
        assert_eq!(
            HasCategory::from_input(None),
            Err(Error::MissingField("category"))
        );
        assert_eq!(
            HasCategory::from_input(Some("Rent".to_owned())).map(|c| c.as_category().map(str::to_owned)),
            Ok(Some("Rent".to_owned()))
        );
    }

    #[test]
    fn incomes_drop_any_category() {
        let slot = NoCategory::from_input(Some("Salary".to_owned())).unwrap();

        assert_eq!(slot.as_category(), None);
    }

    #[test]
    fn policies_have_distinct_kinds() {
        assert_eq!(HasCategory::KIND, TransactionKind::Expense);
        assert_eq!(NoCategory::KIND, TransactionKind::Income);
        assert_eq!(TransactionKind::Expense.as_str(), "expense");
        assert_eq!(TransactionKind::Income.as_str(), "income");
    }
}
