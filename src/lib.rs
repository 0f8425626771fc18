// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Alert PII relay
// Scrubs PII from Cloud Monitoring alert events before they reach PagerDuty

//! Handles one Cloud Monitoring alert event per call.
//!
//! The event's `data` field is decoded, the matched log filter is replaced
//! with `[REDACTED]`, and the document is scanned for names and email
//! addresses. Anything found is replaced with its info type before the
//! document is sent to PagerDuty as the event details.
//!
//! # Examples
//!
//! ```no_run
//! use alert_pii_relay::{AlertRelay, EventEnvelope, RelayConfig};
//!
//! alert_pii_relay::telemetry::init_logging();
//!
//! let relay = AlertRelay::from_config(RelayConfig::from_env()?)?;
//! let envelope: EventEnvelope = serde_json::from_str(r#"{"data": "e30="}"#)?;
//! let outcome = relay.handle_event(&envelope)?;
//! println!("PagerDuty answered {}", outcome.dispatch.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod pii;
pub mod secrets;
pub mod telemetry;

pub use config::RelayConfig;
pub use dispatch::{AlertPayload, AlertSink, DispatchOutcome, PagerDutyDispatcher};
pub use error::{RelayError, Result};
pub use handler::{AlertRelay, EventEnvelope, RelayOutcome};
pub use secrets::{SecretAccessor, SecretManagerClient};
