//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, database_id::TransactionId, session::SessionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, stored as a positive amount.
    Credit,
    /// Money spent, stored with the sign of the amount flipped.
    Debit,
}

impl TransactionType {
    /// The amount as it is stored in the ledger.
    ///
    /// Debits flip the sign of `amount` rather than taking its absolute value,
    /// so a negative debit is recorded as a positive amount.
    pub fn signed_amount(self, amount: f64) -> f64 {
        match self {
            TransactionType::Credit => amount,
            TransactionType::Debit => amount * -1.0,
        }
    }
}

/// A single ledger entry belonging to a session.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The session that recorded the transaction.
    pub session_id: SessionId,
    /// A short description of what the transaction was for.
    pub title: String,
    /// The signed amount of money. Positive for credits, negative for debits.
    pub amount: f64,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Start describing a new transaction.
    ///
    /// `amount` is the amount as entered by the client; the sign is applied
    /// from `kind` when the transaction is stored.
    pub fn build(
        title: &str,
        amount: f64,
        kind: TransactionType,
        session_id: SessionId,
    ) -> NewTransaction {
        NewTransaction {
            title: title.to_owned(),
            amount,
            kind,
            session_id,
        }
    }
}

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short description of what the transaction was for.
    pub title: String,
    /// The unsigned amount as entered by the client.
    pub amount: f64,
    /// Decides the sign of the stored amount.
    pub kind: TransactionType,
    /// The session the transaction is recorded under.
    pub session_id: SessionId,
}

/// The balance of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of the amounts of all the session's transactions.
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a new transaction with a fresh ID, timestamped with the current time.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = new_transaction.kind.signed_amount(new_transaction.amount);

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (id, session_id, title, amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, session_id, title, amount, created_at",
        )?
        .query_row(
            (
                Uuid::new_v4(),
                new_transaction.session_id.as_uuid(),
                new_transaction.title,
                amount,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve every transaction recorded under `session_id`, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions(
    session_id: SessionId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, session_id, title, amount, created_at FROM transactions
         WHERE session_id = :session_id
         ORDER BY created_at, rowid",
    )?;

    let transactions = statement
        .query_map(&[(":session_id", &session_id.as_uuid())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect();

    transactions
}

/// Retrieve a transaction by its `id`, as long as it belongs to `session_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction in the session,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    session_id: SessionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, session_id, title, amount, created_at FROM transactions
             WHERE id = :id AND session_id = :session_id",
        )?
        .query_one(
            &[(":id", &id), (":session_id", &session_id.as_uuid())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Sum the amounts of all transactions recorded under `session_id`.
///
/// A session without transactions has a balance of zero.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_summary(session_id: SessionId, connection: &Connection) -> Result<Summary, Error> {
    let amount = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM transactions WHERE session_id = :session_id",
        &[(":session_id", &session_id.as_uuid())],
        |row| row.get(0),
    )?;

    Ok(Summary { amount })
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id BLOB PRIMARY KEY NOT NULL,
                session_id BLOB NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_session_id ON transactions(session_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let session_id = SessionId::new(row.get(1)?);
    let title = row.get(2)?;
    let amount = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Transaction {
        id,
        session_id,
        title,
        amount,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use crate::{
        Error,
        db::initialize,
        session::SessionId,
        transaction::{
            Summary, Transaction, TransactionType, create_transaction, get_summary,
            get_transaction, get_transactions,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let session_id = SessionId::new_random();
        let before = OffsetDateTime::now_utc() - Duration::seconds(1);

        let transaction = create_transaction(
            Transaction::build("Salary", 5000.0, TransactionType::Credit, session_id),
            &conn,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.title, "Salary");
        assert_eq!(transaction.amount, 5000.0);
        assert_eq!(transaction.session_id, session_id);
        assert!(transaction.created_at >= before);
    }

    #[test]
    fn create_stores_debit_as_negative() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build("Rent", 1200.0, TransactionType::Debit, SessionId::new_random()),
            &conn,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.amount, -1200.0);
    }

    #[test]
    fn create_gives_unique_ids() {
        let conn = get_test_connection();
        let session_id = SessionId::new_random();
        let new = Transaction::build("Coffee", 4.5, TransactionType::Debit, session_id);

        let first = create_transaction(new.clone(), &conn).unwrap();
        let second = create_transaction(new, &conn).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn get_transactions_only_returns_session_rows() {
        let conn = get_test_connection();
        let session_id = SessionId::new_random();
        let other_session_id = SessionId::new_random();
        let want = vec![
            create_transaction(
                Transaction::build("Salary", 5000.0, TransactionType::Credit, session_id),
                &conn,
            )
            .unwrap(),
            create_transaction(
                Transaction::build("Rent", 1200.0, TransactionType::Debit, session_id),
                &conn,
            )
            .unwrap(),
        ];
        create_transaction(
            Transaction::build("Other", 1.0, TransactionType::Credit, other_session_id),
            &conn,
        )
        .unwrap();

        let got = get_transactions(session_id, &conn).expect("Could not get transactions");

        assert_eq!(got, want);
    }

    #[test]
    fn get_transactions_for_new_session_is_empty() {
        let conn = get_test_connection();

        let got = get_transactions(SessionId::new_random(), &conn).unwrap();

        assert!(got.is_empty(), "got {got:?}, want no transactions");
    }

    #[test]
    fn get_transaction_succeeds() {
        let conn = get_test_connection();
        let session_id = SessionId::new_random();
        let want = create_transaction(
            Transaction::build("Salary", 5000.0, TransactionType::Credit, session_id),
            &conn,
        )
        .unwrap();

        let got = get_transaction(want.id, session_id, &conn).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn get_transaction_from_other_session_fails() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build("Salary", 5000.0, TransactionType::Credit, SessionId::new_random()),
            &conn,
        )
        .unwrap();

        let result = get_transaction(transaction.id, SessionId::new_random(), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_missing_transaction_fails() {
        let conn = get_test_connection();

        let result = get_transaction(Uuid::new_v4(), SessionId::new_random(), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn summary_sums_credits_and_debits() {
        let conn = get_test_connection();
        let session_id = SessionId::new_random();
        for (title, amount, kind) in [
            ("Salary", 5000.0, TransactionType::Credit),
            ("Rent", 1200.0, TransactionType::Debit),
            ("Groceries", 300.5, TransactionType::Debit),
        ] {
            create_transaction(Transaction::build(title, amount, kind, session_id), &conn)
                .unwrap();
        }
        create_transaction(
            Transaction::build("Other", 99.0, TransactionType::Credit, SessionId::new_random()),
            &conn,
        )
        .unwrap();

        let summary = get_summary(session_id, &conn).unwrap();

        assert_eq!(summary, Summary { amount: 3499.5 });
    }

    #[test]
    fn summary_of_empty_session_is_zero() {
        let conn = get_test_connection();

        let summary = get_summary(SessionId::new_random(), &conn).unwrap();

        assert_eq!(summary, Summary { amount: 0.0 });
    }
}
