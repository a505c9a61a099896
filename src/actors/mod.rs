//! Actor-based probing and broadcast engine
//!
//! Every component runs as an independent async task communicating over Tokio
//! channels; there is no shared mutable memory beyond each target's own state,
//! which only its in-flight probe touches.
//!
//! ## Architecture Overview
//!
//! ```text
//!   ┌──────────┐ tick  ┌────────────┐ spawn ┌────────┐
//!   │Timer (T1)│──┐    │ Dispatcher │──────▶│ Probe  │──┐
//!   └──────────┘  │    │ (bounded   │       │ task   │  │ publish
//!   ┌──────────┐  ├───▶│  queue)    │──────▶│ ...    │  │
//!   │Timer (Tn)│──┘    └────────────┘       └────────┘  │
//!   └──────────┘                                        ▼
//!                                            ┌─────────────────┐
//!                          subscribe ───────▶│   BrokerActor   │
//!                          unsubscribe ─────▶│ (subscriber set)│
//!                                            └───┬───────┬─────┘
//!                                                ▼       ▼
//!                                            stream 1 … stream N
//! ```
//!
//! - **scheduler**: one drift-correcting timer loop per target
//! - **dispatcher**: decouples "due" from "executing", one task per probe
//! - **prober**: runs the HTTP check, classifies, mutates target state,
//!   decides edge-triggered alerts
//! - **broker**: linearizes subscriber membership and result fan-out

pub mod broker;
pub mod dispatcher;
pub mod messages;
pub mod prober;
pub mod scheduler;
