//! Persistent session storage.

mod file;
mod memory;
mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{SessionStorage, SessionStorageExt};

/// Key holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key holding the serialized user record.
pub const USER_KEY: &str = "user";

/// Every key owned by the session, cleared together.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];
