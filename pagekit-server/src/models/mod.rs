//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod store;
pub mod page;
pub mod widget;
pub mod patch;

pub use validation::ValidationError;
pub use store::{StoreName, StoreSlug};
pub use page::{PageName, PageRoute};
pub use widget::{WidgetConfig, WidgetType};
pub use patch::Patch;
