//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for recording transactions
//! - Database functions for storing, querying, and summing transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod query_endpoints;

pub use core::{NewTransaction, Summary, Transaction, TransactionType, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use query_endpoints::{
    SummaryResponse, TransactionList, get_summary_endpoint, get_transaction_endpoint,
    get_transactions_endpoint,
};

#[cfg(test)]
pub use core::{create_transaction, get_summary, get_transaction, get_transactions};
