//! pagekit-server: page-builder backend
//!
//! Stores own pages, pages own ordered widgets. The [`engine`] keeps two
//! rules true between transactions: at most one home page per store, and
//! widget positions `0..n` with no gaps or duplicates. Every failure is an
//! [`Error`] with a closed [`ErrorKind`], rendered by the [`http`] layer as a
//! JSON error envelope.

pub mod db;
pub mod decode;
pub mod engine;
pub mod error;
pub mod http;
pub mod models;

pub use engine::Engine;
pub use error::{Error, ErrorKind, Invariant, Result};
pub use http::{build_router, run_server, ServerConfig};
