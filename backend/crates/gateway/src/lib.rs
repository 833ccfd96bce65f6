//! Gateway (Client Request Gateway) Module
//!
//! Client-side counterpart of the auth backend:
//! - Attaches the in-memory access token to outgoing requests
//! - Keeps the refresh token confined to the cookie jar
//! - On 401, refreshes once and replays the request; concurrent 401s
//!   share a single refresh via the single-flight coordinator
//! - An unrecoverable refresh drops the whole session, observable
//!   through [`Session::subscribe`]

pub mod client;
pub mod error;
pub mod session;
pub mod single_flight;

pub use client::ApiClient;
pub use error::{GatewayError, GatewayResult};
pub use session::{AuthState, Identity, Session};
pub use single_flight::{Flight, SingleFlight};
