//! Database ID type definition.

use uuid::Uuid;

/// Alias for the type used for transaction IDs in the database.
pub type TransactionId = Uuid;
