//! Depth resolution - locating the n-th definition of a name

use crate::provider::{Match, ProviderChain};

use super::error::ResolutionError;

/// Return the `depth`-th definition of `name` (1-based)
///
/// The match sequence is every provider's matches in provider order, each
/// provider enumerating from its own first root. The remaining depth carries
/// across provider boundaries; it is never reset when moving on.
pub fn resolve(chain: &ProviderChain, name: &str, depth: usize) -> Result<Match, ResolutionError> {
    // Depth is 1-based; zero never matches
    if depth == 0 {
        return Err(ResolutionError::not_found(name));
    }

    let mut remaining = depth;
    for provider in chain.providers() {
        for found in provider.matches(name) {
            if remaining == 1 {
                tracing::debug!(
                    name,
                    depth,
                    provider = provider.label(),
                    origin = %found.origin,
                    "resolved override layer"
                );
                return Ok(found);
            }
            remaining -= 1;
        }
        tracing::trace!(name, provider = provider.label(), remaining, "provider exhausted");
    }

    Err(ResolutionError::not_found(name))
}
