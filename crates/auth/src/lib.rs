//! OAuth2 authorization code flow against the APS identity provider.
//!
//! [`ProviderClient`] builds authorization URLs, exchanges codes for access
//! tokens and fetches user profiles; [`LoginSession`] carries the state of one
//! attempt between those steps. The [`flow`] module wires both to a local
//! redirect listener for interactive use.

pub mod callback;
pub mod flow;
pub mod provider;
pub mod session;

pub use provider::ProviderClient;
pub use session::LoginSession;
