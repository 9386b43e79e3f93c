//! Session management - persisted authentication state
//!
//! The store is the single source of truth for who is logged in; the cookie
//! jar is its persistence layer, mirroring the browser's named cookies.

pub mod persistence;
pub mod store;


pub use persistence::{CookieJar, SESSION_COOKIES};
pub use store::{Session, SessionStore};
