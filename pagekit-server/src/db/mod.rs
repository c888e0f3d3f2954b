//! Database layer - connection pool, unit of work and repositories
//!
//! # Design Principles
//!
//! - Connection pool with bounded open/idle connections - no Arc<Mutex<Connection>>
//! - Repositories borrow a connection; multi-statement work borrows a
//!   [`UnitOfWork`] transaction instead
//! - Rely on DB constraints and classify their violations - no check-then-insert
//! - Every call runs under a request [`Deadline`]

pub mod classify;
pub mod deadline;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod unit_of_work;

pub use deadline::Deadline;
pub use pool::{create_pool, PoolConfig};
pub use repos::*;
pub use unit_of_work::UnitOfWork;
