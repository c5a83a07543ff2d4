//! Authentication: password hashing, JWT issuance, token revocation

pub mod blacklist;
pub mod jwt;
pub mod password;

pub use blacklist::TokenBlacklist;
pub use jwt::Claims;
pub use jwt::JwtService;
pub use password::hash_password;
pub use password::verify_password;
