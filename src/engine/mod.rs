//! Query engine communication module.
//!
//! The sampler talks to a Trino coordinator over its HTTP statement
//! protocol. The rest of the crate never sees HTTP: it gets column names and
//! JSON rows back, or an [`EngineError`] saying whether the engine was
//! unreachable or the statement itself failed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    EngineClient (reqwest)                       │
//! │  POST /v1/statement ──► QueryResults { nextUri, columns, data } │
//! │  GET nextUri ... until nextUri is absent                        │
//! │  DELETE nextUri when the statement fails mid-flight             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod error;
pub mod protocol;
pub mod query;

pub use client::EngineClient;
pub use error::{EngineError, EngineResult};
pub use protocol::QueryOutput;
