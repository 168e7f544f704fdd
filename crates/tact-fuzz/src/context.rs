//! Per-sample generation state.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::FuzzConfig;
use crate::error::{FuzzError, Result};
use crate::scope::{ScopeId, ScopeTree};
use crate::util::{is_reserved, random_name};

/// Everything a generator may read or mutate while building one program:
/// configuration, the seeded RNG, the scope tree, the names handed out so far
/// and the current expression depth.
pub struct Session {
    pub config: FuzzConfig,
    pub rng: StdRng,
    pub scopes: ScopeTree,
    used_names: HashSet<String>,
    depth: usize,
    peak_depth: usize,
}

impl Session {
    pub fn new(config: FuzzConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            scopes: ScopeTree::new(),
            used_names: HashSet::new(),
            depth: 0,
            peak_depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest depth at which an expression generator was constructed.
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    /// Whether the depth ceiling has been reached; no new declarations may be
    /// synthesized past it.
    pub fn at_depth_limit(&self) -> bool {
        self.depth >= self.config.max_depth
    }

    pub(crate) fn observe_depth(&mut self) {
        self.peak_depth = self.peak_depth.max(self.depth);
    }

    /// Run `f` one level deeper. The level is left again on every exit path.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        let result = f(self);
        self.leave()?;
        result
    }

    fn leave(&mut self) -> Result<()> {
        self.depth = self.depth.checked_sub(1).ok_or(FuzzError::NegativeDepth)?;
        Ok(())
    }

    /// Reset the depth between independent runs sharing a session.
    pub fn reset_depth(&mut self) {
        self.depth = 0;
    }

    /// A name not used anywhere in this program so far.
    pub fn fresh_name(&mut self, scope: ScopeId, capitalized: bool) -> String {
        loop {
            let name = random_name(&mut self.rng, capitalized);
            if is_reserved(&name)
                || self.used_names.contains(&name)
                || self.scopes.has_recursive(scope, &name)
            {
                continue;
            }
            self.used_names.insert(name.clone());
            return name;
        }
    }

    /// Record a supplied name so fresh names never collide with it.
    pub fn reserve_name(&mut self, name: &str) {
        self.used_names.insert(name.to_string());
    }
}
