//! Authentication: JWT validation and caller extraction.

pub mod caller;
pub mod jwt;

pub use caller::{Caller, MaybeCaller};
pub use jwt::{JwtAuthenticator, JwtClaims};
