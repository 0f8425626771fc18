// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber; honors `RUST_LOG`
///
/// Safe to call more than once. Later calls leave the first subscriber in
/// place.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,alert_pii_relay=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .try_init();
}
