pub mod session;

pub use session::{AuthSession, SessionStore};
