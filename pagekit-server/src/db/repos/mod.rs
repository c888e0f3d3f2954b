//! Repository implementations
//!
//! Each repository borrows a single connection (pooled or the one inside a
//! [`UnitOfWork`](super::UnitOfWork) transaction). Repositories never open
//! transactions themselves.

pub mod pages;
pub mod stores;
pub mod widgets;

pub use pages::{NewPage, Page, PageChanges, PageRepo};
pub use stores::{NewStore, Store, StoreChanges, StoreRepo};
pub use widgets::{NewWidget, Widget, WidgetChanges, WidgetRepo};
