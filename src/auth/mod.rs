/// Authentication module
///
/// Stateless bearer tokens: the claims payload, the maker capability and its
/// two backends (HMAC-signed JWT and sealed `v4.local` tokens), plus the key
/// ring used for rotation.

mod claims;
mod jwt;
mod keyring;
mod maker;
mod paseto;
mod payload;

pub use jwt::{JwtMaker, MIN_SECRET_LENGTH};
pub use keyring::KeyRing;
pub use maker::{Maker, TokenKind, TokenMaker};
pub use paseto::{PasetoMaker, SYMMETRIC_KEY_LENGTH};
pub use payload::Payload;
