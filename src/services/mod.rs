//! Business logic services.
//!
//! Services contain core logic separated from HTTP handlers: the ephemeral
//! token store guarding file access, and the HubSpot API client.

pub mod hubspot;
pub mod token_store;
