mod auth;

pub use auth::{bearer_identity_middleware, AuthRequired, AuthUser};
