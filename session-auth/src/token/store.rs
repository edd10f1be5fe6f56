//! Token storage trait.

use secrecy::SecretString;

/// Storage for the single active bearer token.
///
/// Operations never fail from the caller's point of view. A store that cannot
/// read or write behaves as if no token were present, which downstream turns
/// into an anonymous session.
///
/// Setting a token supersedes the previous one. Nothing is revoked on the server.
pub trait TokenStore: Send + Sync {
    /// Persist `token`, overwriting any existing value. The shape is not checked.
    fn set(&self, token: &str);

    /// The persisted token, or `None` when absent or expired.
    fn get(&self) -> Option<SecretString>;

    /// Remove the persisted token.
    fn clear(&self);
}

/// First ten characters of a token for log output.
pub fn preview(token: &str) -> String {
    let head: String = token.chars().take(10).collect();
    format!("{head}...")
}
