/// JWT signing configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl: u64,
}

pub const DEFAULT_TOKEN_TTL: u64 = 7 * 24 * 60 * 60;

impl AuthConfig {
    pub fn new(jwt_secret: String, token_ttl: u64) -> Self {
        Self {
            jwt_secret,
            token_ttl,
        }
    }
}
