//! Bearer token persistence with cookie semantics.

mod cookie;
mod file;
mod memory;
mod store;

pub use cookie::{CookieRecord, AUTH_COOKIE_NAME, COOKIE_MAX_AGE_SECS, COOKIE_PATH};
pub use file::FileCookieStore;
pub use memory::MemoryCookieStore;
pub use store::{preview, TokenStore};
