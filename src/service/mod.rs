pub mod session_actor;
pub mod session_registry;

pub use session_actor::SessionHandle;
pub use session_registry::{SessionId, SessionLease, SessionRegistry};
