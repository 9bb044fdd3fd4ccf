//! Endpoints for reading a session's transactions and its balance.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState, Error,
    session::SessionId,
    transaction::{
        Summary, Transaction,
        core::{get_summary, get_transaction, get_transactions},
    },
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct TransactionQueryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionQueryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

impl TransactionQueryState {
    fn lock_connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

/// The response body listing a session's transactions.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionList {
    /// The session's transactions, oldest first.
    pub transactions: Vec<Transaction>,
}

/// The response body holding a session's balance.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// The session's balance.
    pub summary: Summary,
}

/// A route handler for listing the transactions in the client's session.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionQueryState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<TransactionList>, Error> {
    let connection = state.lock_connection()?;
    let transactions = get_transactions(session_id, &connection)?;

    Ok(Json(TransactionList { transactions }))
}

/// A route handler for getting one of the transactions in the client's session.
///
/// Transactions from other sessions are reported as not found.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionQueryState>,
    Extension(session_id): Extension<SessionId>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = path.map_err(|rejection| {
        tracing::debug!("rejected transaction path: {rejection}");
        Error::InvalidTransactionId(rejection.body_text())
    })?;

    let transaction_id = Uuid::parse_str(&transaction_id)
        .map_err(|_| Error::InvalidTransactionId(transaction_id))?;

    let connection = state.lock_connection()?;
    let transaction = get_transaction(transaction_id, session_id, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for getting the balance of the client's session.
pub async fn get_summary_endpoint(
    State(state): State<TransactionQueryState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<SummaryResponse>, Error> {
    let connection = state.lock_connection()?;
    let summary = get_summary(session_id, &connection)?;

    Ok(Json(SummaryResponse { summary }))
}
