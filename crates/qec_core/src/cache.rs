//! Shared cache of built codes.
//!
//! Building a code validates it and precomputes its decoding structures,
//! which is far more expensive than decoding one syndrome. Codes are built
//! once per `(family, size)` and handed out as `Arc`s; concurrent readers
//! never block each other.

use crate::QecResult;
use crate::code::{StabilizerCode, build_code_with};
use crate::config::LookupConfig;
use qec_common::family::CodeFamily;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct CodeCache {
    lookup: LookupConfig,
    codes: RwLock<HashMap<(CodeFamily, usize), Arc<StabilizerCode>>>,
}

impl CodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose codes are built with the given lookup limits.
    pub fn with_lookup(lookup: LookupConfig) -> Self {
        Self {
            lookup,
            codes: RwLock::default(),
        }
    }

    /// Process-wide cache with default limits.
    pub fn global() -> &'static CodeCache {
        static GLOBAL: OnceLock<CodeCache> = OnceLock::new();
        GLOBAL.get_or_init(CodeCache::new)
    }

    /// BB families accept several spellings of their one size.
    fn key(family: CodeFamily, size: usize) -> (CodeFamily, usize) {
        match family {
            CodeFamily::Bb(bb) => {
                let params = bb.params();
                if size == 0 || size == params.d {
                    (family, params.n)
                } else {
                    (family, size)
                }
            }
            _ => (family, size),
        }
    }

    /// Returns the cached code, building it on first request.
    ///
    /// Build errors are returned and nothing is cached. Two threads missing
    /// at once may both build; the first insert wins.
    pub fn get_or_build(&self, family: CodeFamily, size: usize) -> QecResult<Arc<StabilizerCode>> {
        let key = Self::key(family, size);
        if let Some(code) = self
            .codes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(code));
        }

        let built = Arc::new(build_code_with(family, size, &self.lookup)?);
        let mut codes = self.codes.write().unwrap_or_else(PoisonError::into_inner);
        let code = match codes.entry(key) {
            Entry::Occupied(entry) => {
                warn!(%family, size, "concurrent build discarded");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                debug!(%family, size, "cached code");
                entry.insert(built)
            }
        };
        Ok(Arc::clone(code))
    }

    pub fn len(&self) -> usize {
        self.codes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.codes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_common::family::BbFamily;
    use rayon::prelude::*;

    #[test]
    fn repeated_requests_share_one_code() {
        let cache = CodeCache::new();
        let a = cache.get_or_build(CodeFamily::Surface, 3).unwrap();
        let b = cache.get_or_build(CodeFamily::Surface, 3).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bb_size_spellings_share_an_entry() {
        let cache = CodeCache::new();
        let by_zero = cache.get_or_build(CodeFamily::Bb(BbFamily::Bb72), 0).unwrap();
        let by_d = cache.get_or_build(CodeFamily::Bb(BbFamily::Bb72), 6).unwrap();
        let by_n = cache.get_or_build(CodeFamily::Bb(BbFamily::Bb72), 72).unwrap();
        assert!(Arc::ptr_eq(&by_zero, &by_d));
        assert!(Arc::ptr_eq(&by_zero, &by_n));
    }

    #[test]
    fn failed_builds_are_not_cached() {
        let cache = CodeCache::new();
        assert!(cache.get_or_build(CodeFamily::Color, 4).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_readers_agree() {
        let cache = CodeCache::new();
        let codes: Vec<_> = (0..16)
            .into_par_iter()
            .map(|_| cache.get_or_build(CodeFamily::Toric, 3).unwrap())
            .collect();
        assert!(codes.iter().all(|c| Arc::ptr_eq(c, &codes[0])));
    }
}
