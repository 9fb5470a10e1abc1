//! Authenticated request client for the hirelane REST API.
//!
//! Wraps a reqwest transport, attaches the bearer token for a request's
//! namespace, and transparently recovers from a single authorization failure
//! by coordinating one shared token refresh across all concurrently failing
//! requests.

mod client;
mod default_client;
mod error;
mod refresh;
mod session;
mod wire;

pub use client::Client;
pub use client::ClientBuilder;
pub use client::DEFAULT_REFRESH_PATH;
pub use client::DEFAULT_REQUEST_TIMEOUT;
pub use client::RequestOptions;
pub use default_client::USER_AGENT;
pub use default_client::create_client;
pub use error::Error;
pub use error::RefreshFailedReason;
pub use error::Result;
pub use session::COMPANY_LOGIN_PATH;
pub use session::LOGOUT_PATH;
pub use session::LoginRequest;
pub use session::USER_LOGIN_PATH;

pub use hirelane_auth::MemorySessionStore;
pub use hirelane_auth::NavigationNotifier;
pub use hirelane_auth::NoopNavigator;
pub use hirelane_auth::SessionStore;
pub use hirelane_auth::TokenNamespace;
