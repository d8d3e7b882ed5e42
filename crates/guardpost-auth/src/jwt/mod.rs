//! JWT token encoding, decoding, and claims.
//!
//! Access and refresh tokens are separate signing domains: each class has
//! its own secret and lifetime, and a token of one class never verifies
//! as the other.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{AccessClaims, RefreshClaims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedToken, JwtEncoder};
