/// Middleware module
///
/// Bearer-token authentication for protected scopes.

mod bearer;

pub use bearer::{bearer_token, BearerAuth};
