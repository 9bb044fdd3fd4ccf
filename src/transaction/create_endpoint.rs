//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::SignedCookieJar;
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    json_body::JsonBody,
    session::{SessionId, get_session_id, set_session_cookie},
    transaction::{Transaction, TransactionType, core::create_transaction},
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// How long a newly issued session cookie lives for.
    pub session_duration: Duration,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            session_duration: state.session_duration,
        }
    }
}

/// The JSON body for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionBody {
    /// Text describing the transaction.
    pub title: String,
    /// The amount of money, before the sign for `kind` is applied.
    pub amount: f64,
    /// Whether the money came in or went out.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// A route handler for recording a new transaction under the client's session.
///
/// Clients without a valid session cookie are given a new session.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    jar: SignedCookieJar,
    JsonBody(body): JsonBody<CreateTransactionBody>,
) -> Result<(SignedCookieJar, StatusCode), Error> {
    let (jar, session_id) = match get_session_id(&jar) {
        Some(session_id) => (jar, session_id),
        None => {
            let session_id = SessionId::new_random();
            tracing::info!("Starting new session {session_id}");

            (
                set_session_cookie(jar, session_id, state.session_duration),
                session_id,
            )
        }
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(
        Transaction::build(&body.title, body.amount, body.kind, session_id),
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    tracing::debug!(
        "Created transaction {} in session {session_id}",
        transaction.id
    );

    Ok((jar, StatusCode::CREATED))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::{SignedCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        db::initialize,
        json_body::JsonBody,
        session::{
            COOKIE_SESSION_ID, DEFAULT_SESSION_DURATION, SessionId, get_session_id,
            set_session_cookie,
        },
        transaction::{
            TransactionType,
            core::get_transactions,
            create_endpoint::{CreateTransactionBody, CreateTransactionState},
            create_transaction_endpoint,
        },
    };

    fn get_test_state() -> CreateTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            session_duration: DEFAULT_SESSION_DURATION,
        }
    }

    fn get_jar() -> SignedCookieJar {
        let hash = Sha512::digest(b"foobar");
        SignedCookieJar::new(Key::from(&hash))
    }

    fn body(title: &str, amount: f64, kind: TransactionType) -> JsonBody<CreateTransactionBody> {
        JsonBody(CreateTransactionBody {
            title: title.to_owned(),
            amount,
            kind,
        })
    }

    #[tokio::test]
    async fn can_create_transaction_and_start_session() {
        let state = get_test_state();

        let (jar, status) = create_transaction_endpoint(
            State(state.clone()),
            get_jar(),
            body("Salary", 5000.0, TransactionType::Credit),
        )
        .await
        .expect("Could not create transaction");

        assert_eq!(status, StatusCode::CREATED);
        let session_id = get_session_id(&jar).expect("expected a session cookie to be set");
        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions(session_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].title, "Salary");
        assert_eq!(transactions[0].amount, 5000.0);
    }

    #[tokio::test]
    async fn debit_is_stored_as_negative_amount() {
        let state = get_test_state();

        let (jar, _) = create_transaction_endpoint(
            State(state.clone()),
            get_jar(),
            body("Rent", 1200.0, TransactionType::Debit),
        )
        .await
        .expect("Could not create transaction");

        let session_id = get_session_id(&jar).unwrap();
        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions(session_id, &connection).unwrap();
        assert_eq!(transactions[0].amount, -1200.0);
    }

    #[tokio::test]
    async fn existing_session_is_reused() {
        let state = get_test_state();
        let session_id = SessionId::new_random();
        let jar = set_session_cookie(get_jar(), session_id, DEFAULT_SESSION_DURATION);

        let (jar, _) = create_transaction_endpoint(
            State(state.clone()),
            jar,
            body("Coffee", 4.5, TransactionType::Debit),
        )
        .await
        .expect("Could not create transaction");

        assert_eq!(get_session_id(&jar), Some(session_id));
        assert!(jar.get(COOKIE_SESSION_ID).is_some());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transactions(session_id, &connection).unwrap().len(), 1);
    }
}
