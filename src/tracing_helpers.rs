//! Span constructors shared by the executors, transactions and dialects
//!
//! Only compiled with the `tracing` feature. Callers enter the span for the
//! duration of one blocking database call.

use tracing::{info_span, Span};

/// Longest SQL prefix recorded on a query span
const MAX_STATEMENT_LEN: usize = 120;

fn truncate_statement(query: &str) -> &str {
    let trimmed = query.trim();
    match trimmed.char_indices().nth(MAX_STATEMENT_LEN) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

/// Span around a single statement or query
pub fn execute_query_span(query: &str) -> Span {
    info_span!("shoreline.execute_query", db.statement = truncate_statement(query))
}

/// Span around opening a connection
pub fn acquire_connection_span(backend: &str) -> Span {
    info_span!("shoreline.acquire_connection", db.system = backend)
}

pub fn begin_transaction_span() -> Span {
    info_span!("shoreline.begin_transaction")
}

pub fn commit_transaction_span() -> Span {
    info_span!("shoreline.commit_transaction")
}

pub fn rollback_transaction_span() -> Span {
    info_span!("shoreline.rollback_transaction")
}

/// Span around a dialect's post-creation bootstrap
pub fn run_aux_span(dialect: &str) -> Span {
    info_span!("shoreline.run_aux", db.system = dialect)
}
