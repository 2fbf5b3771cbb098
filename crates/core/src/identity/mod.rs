//! Discriminated usernames and the client-side username cache.
//!
//! - [`full_username`]: the `base#discriminator` value type
//! - [`mapping`]: the percent-encoded JSON cache kept in a cookie
//! - [`discriminator`]: allocation of free discriminators at registration
//! - [`reconciler`]: deciding which cached full username applies to a login

pub mod discriminator;
pub mod full_username;
pub mod mapping;
pub mod reconciler;

/// Separates the base username from its discriminator.
pub const SEPARATOR: char = '#';

pub use discriminator::DiscriminatorAllocator;
pub use full_username::{format_full_username, FullUsername};
pub use mapping::UsernameMapping;
pub use reconciler::{lookup, matches, reconcile, UsernameReconciler};
