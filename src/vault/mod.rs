//! Vault-side persistence services, reachable once secret mode is active

pub mod contacts;
pub mod messages;
pub mod profile;
