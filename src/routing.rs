//! Application router configuration with session-guarded and open route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    hello::get_hello,
    not_found::get_404_not_found,
    session::session_guard,
    transaction::{
        create_transaction_endpoint, get_summary_endpoint, get_transaction_endpoint,
        get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let open_routes = Router::new()
        .route(endpoints::HELLO, get(get_hello))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint));

    let session_routes = Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::TRANSACTIONS_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), session_guard));

    session_routes
        .merge(open_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
