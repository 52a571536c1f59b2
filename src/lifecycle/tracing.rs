//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global subscriber. Filtering comes from
//! `RUST_LOG`; the format from [`LogFormat`].
//!
//! Compact output hides the module path (`with_target(false)`); the store logs
//! carry a `store` field and an `op` field naming the operation instead:
//!
//! ```text
//!  INFO create_order{lines=2}: Order created order_id=order_1 total_price=7000
//!  INFO Committed store="Tables" op="create_order"
//!  WARN Rolled back store="Tables" op="update_order"
//! ```
//!
//! JSON output is meant for log shipping and keeps span context on every line.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug LOG_FORMAT=json cargo run
//! ```

use crate::lifecycle::LogFormat;
use tracing_subscriber::EnvFilter;

pub fn setup_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}
