pub mod form;
pub mod session;

pub use form::InventoryForm;
pub use session::{DbSession, SESSION_COOKIE};
