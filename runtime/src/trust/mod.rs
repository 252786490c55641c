//! Credential handling. Provisioning happens outside this crate; we only
//! copy provided values into the config document.

pub mod credentials;
