/// Application name
pub const APP_NAME: &str = "Parley";

/// XChaCha20-Poly1305 nonce size in bytes
pub const NONCE_SIZE: usize = 24;

/// Symmetric key size in bytes (for XChaCha20-Poly1305)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Key derivation context for the at-rest session key (BLAKE3)
pub const KDF_CONTEXT_SESSION_KEY: &str = "parley-session-key-v1";

/// Default number of messages per history page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Password length bounds (characters)
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 64;

/// Verification / reset codes are six decimal digits
pub const CODE_LEN: usize = 6;
pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// Display name length bounds (characters)
pub const NAME_MAX_LEN: usize = 50;

/// Username length bounds (characters)
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;

/// Maximum bio length (characters)
pub const BIO_MAX_LEN: usize = 150;

/// Maximum chat name length (characters)
pub const CHAT_NAME_MAX_LEN: usize = 50;
