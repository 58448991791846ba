pub mod cookie;
pub mod middleware;
pub mod store;

pub use middleware::CurrentSession;
pub use store::{Session, SessionStore};
