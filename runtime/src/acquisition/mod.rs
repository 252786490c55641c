//! Acquisition layer: authenticated session headers and the retrying HTTP client.

pub mod http_client;
pub mod http_session;
