//! Route handlers organized by resource

pub mod health;
pub mod pages;
pub mod stores;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;
