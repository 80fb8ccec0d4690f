pub mod error;
pub mod google;
pub mod session;
pub mod telegram;
pub mod types;

pub use error::IdentityError;
pub use types::{ChatLoginPayload, GoogleLoginPayload, NormalizedIdentity, PublicUser};
