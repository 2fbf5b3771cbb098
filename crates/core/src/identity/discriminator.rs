//! Discriminator allocation at registration time.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::full_username::format_full_username;
use crate::config::AccountConfig;
use crate::errors::DiscriminatorError;

/// Hands out free discriminators for a base username.
#[derive(Debug, Clone)]
pub struct DiscriminatorAllocator {
    max: u16,
    width: usize,
    reserved: String,
}

impl DiscriminatorAllocator {
    pub fn new(config: &AccountConfig) -> Self {
        Self {
            max: config.discriminator_max,
            width: config.discriminator_width,
            reserved: config.admin_username.to_lowercase(),
        }
    }

    /// Pick a discriminator in `1..=max` that is not in `taken`, uniformly
    /// at random. The admin name is never handed a discriminator.
    pub fn allocate(&self, username: &str, taken: &HashSet<u16>) -> Result<u16, DiscriminatorError> {
        self.allocate_with(&mut rand::thread_rng(), username, taken)
    }

    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        username: &str,
        taken: &HashSet<u16>,
    ) -> Result<u16, DiscriminatorError> {
        if username.trim().to_lowercase() == self.reserved {
            return Err(DiscriminatorError::Reserved {
                username: username.to_string(),
            });
        }

        let available: Vec<u16> = (1..=self.max).filter(|d| !taken.contains(d)).collect();

        let chosen = available
            .choose(rng)
            .copied()
            .ok_or_else(|| DiscriminatorError::Exhausted {
                username: username.to_string(),
                max: self.max,
            })?;

        debug!(
            username,
            discriminator = chosen,
            free = available.len(),
            "allocated discriminator"
        );
        Ok(chosen)
    }

    /// Render `base` with `discriminator` at the configured width.
    pub fn full_username(&self, base: &str, discriminator: u16) -> String {
        format_full_username(base, discriminator, self.width)
    }
}

impl Default for DiscriminatorAllocator {
    fn default() -> Self {
        Self::new(&AccountConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small(max: u16) -> DiscriminatorAllocator {
        DiscriminatorAllocator::new(&AccountConfig {
            discriminator_max: max,
            ..Default::default()
        })
    }

    #[test]
    fn test_allocate_in_range() {
        let alloc = DiscriminatorAllocator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let d = alloc.allocate_with(&mut rng, "alice", &HashSet::new()).unwrap();
            assert!((1..=9999).contains(&d));
        }
    }

    #[test]
    fn test_allocate_skips_taken() {
        let alloc = small(5);
        let taken: HashSet<u16> = [1, 2, 4, 5].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(alloc.allocate_with(&mut rng, "bob", &taken).unwrap(), 3);
        }
    }

    #[test]
    fn test_allocate_exhausted() {
        let alloc = small(3);
        let taken: HashSet<u16> = (1..=3).collect();
        assert_eq!(
            alloc.allocate("carol", &taken),
            Err(DiscriminatorError::Exhausted {
                username: "carol".into(),
                max: 3
            })
        );
    }

    #[test]
    fn test_allocate_rejects_admin_name() {
        let alloc = DiscriminatorAllocator::default();
        for name in ["admin", "Admin", " ADMIN "] {
            assert_eq!(
                alloc.allocate(name, &HashSet::new()),
                Err(DiscriminatorError::Reserved {
                    username: name.into()
                })
            );
        }

        let alloc = DiscriminatorAllocator::new(&AccountConfig {
            admin_username: "Root".into(),
            ..Default::default()
        });
        assert!(alloc.allocate("admin", &HashSet::new()).is_ok());
        assert!(alloc.allocate("root", &HashSet::new()).is_err());
    }

    #[test]
    fn test_full_username_uses_width() {
        let alloc = DiscriminatorAllocator::new(&AccountConfig {
            discriminator_width: 6,
            ..Default::default()
        });
        assert_eq!(alloc.full_username("dave", 12), "dave#000012");
        assert_eq!(DiscriminatorAllocator::default().full_username("dave", 12), "dave#0012");
    }
}
