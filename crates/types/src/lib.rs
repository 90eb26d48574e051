//! Core types and traits for the aps-login workspace.
//!
//! This crate defines the shared abstractions used by the provider client and
//! its callers: the error taxonomy of a login attempt, the normalized user
//! profile, the token endpoint's wire shape, and the narrow trait through
//! which callback parameters are read.

pub mod error;
pub mod profile;
pub mod token;
pub mod traits;

pub use error::ApsError;
pub use profile::UserProfile;
pub use token::ProviderToken;
pub use traits::{CallbackParams, Result};
