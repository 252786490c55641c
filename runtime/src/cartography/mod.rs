//! Cartography of the administrative hierarchy: the district enumeration,
//! the staged fetcher, request pacing, and the reverse mapper.

pub mod districts;
pub mod fetcher;
pub mod rate_limiter;
pub mod reverse_mapper;
