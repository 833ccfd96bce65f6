//! Presentation Layer
//!
//! HTTP handlers, DTOs, routers, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{AuthMiddlewareState, AuthenticatedUser, require_access_token};
pub use router::{auth_router, auth_router_generic, user_router, user_router_generic};
