//! usertag core library.
//!
//! Login names are not unique on their own; accounts are identified by a
//! full username `base#discriminator`. This crate provides the pieces around
//! the client-side cache of full usernames: configuration, the cache cookie
//! codec, discriminator allocation, and the reconciliation that decides
//! whether a cached full username applies to what the user typed.

pub mod config;
pub mod cookie;
pub mod errors;
pub mod identity;
pub mod login;

// Re-exports for convenience.
pub use config::AppConfig;
pub use identity::{lookup, matches, reconcile, FullUsername, UsernameMapping, UsernameReconciler};
pub use login::{LoginForm, LoginTarget};
