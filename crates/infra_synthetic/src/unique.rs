//! Uniqueness guard for natural keys.

use std::collections::HashSet;
use std::hash::Hash;

/// Random draws attempted before falling back to disambiguation.
pub const DEFAULT_ATTEMPTS: usize = 32;

/// Hands out values that have not been handed out before.
///
/// A fresh candidate is drawn up to `attempts` times. If every draw collides,
/// the last candidate is disambiguated with an increasing counter until an
/// unused value comes out, so uniqueness never depends on luck.
#[derive(Debug, Clone)]
pub struct UniqueGuard<T> {
    seen: HashSet<T>,
    attempts: usize,
}

impl<T: Eq + Hash + Clone> UniqueGuard<T> {
    pub fn new() -> Self {
        Self::with_attempts(DEFAULT_ATTEMPTS)
    }

    pub fn with_attempts(attempts: usize) -> Self {
        Self {
            seen: HashSet::new(),
            attempts: attempts.max(1),
        }
    }

    /// Next unique value.
    ///
    /// `disambiguate(candidate, n)` must return distinct values for distinct
    /// `n`.
    pub fn next(
        &mut self,
        mut draw: impl FnMut() -> T,
        disambiguate: impl Fn(&T, usize) -> T,
    ) -> T {
        let mut candidate = draw();
        for _ in 1..self.attempts {
            if !self.seen.contains(&candidate) {
                break;
            }
            candidate = draw();
        }
        if self.seen.contains(&candidate) {
            let base = candidate;
            let mut counter = 1;
            candidate = disambiguate(&base, counter);
            while self.seen.contains(&candidate) {
                counter += 1;
                candidate = disambiguate(&base, counter);
            }
        }
        self.seen.insert(candidate.clone());
        candidate
    }

    /// Record a value produced elsewhere. Returns `false` if already taken.
    pub fn reserve(&mut self, value: T) -> bool {
        self.seen.insert(value)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<T: Eq + Hash + Clone> Default for UniqueGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_draw_is_disambiguated() {
        let mut guard = UniqueGuard::new();
        let values: Vec<String> = (0..5)
            .map(|_| guard.next(|| "BOOK".to_string(), |base, n| format!("{}_{}", base, n)))
            .collect();
        assert_eq!(values, vec!["BOOK", "BOOK_1", "BOOK_2", "BOOK_3", "BOOK_4"]);
    }

    #[test]
    fn test_retries_before_disambiguating() {
        let mut guard = UniqueGuard::with_attempts(4);
        assert!(guard.reserve(1_i64));
        let mut draws = vec![3, 1, 1].into_iter();
        let value = guard.next(|| draws.next().unwrap_or(0), |base, n| base + n as i64);
        assert_eq!(value, 3);
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn test_integer_keys_stay_unique() {
        let mut guard = UniqueGuard::with_attempts(2);
        let mut values: Vec<i64> = (0..50)
            .map(|_| guard.next(|| 7, |base, n| base + n as i64))
            .collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 50);
    }
}
