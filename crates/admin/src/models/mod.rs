//! Types the admin keeps in its session.

pub mod session;

pub use session::{BearerToken, CurrentAdmin, keys as session_keys};
