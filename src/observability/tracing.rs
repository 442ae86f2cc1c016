use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::types::ids::AccountId;

/// Install the global subscriber. `RUST_LOG` overrides `level` when set.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}

pub fn trace_operation(operation: &'static str, sender: &AccountId) -> Span {
    tracing::info_span!(
        "operation",
        operation,
        sender = %sender,
    )
}

pub fn trace_settlement(account: &AccountId) -> Span {
    tracing::debug_span!(
        "settlement",
        account = %account,
    )
}
