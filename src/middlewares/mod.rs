mod admin;
mod jwt_auth;

pub use admin::admin_middleware;
pub use jwt_auth::{jwt_auth_middleware, optional_auth_middleware};
