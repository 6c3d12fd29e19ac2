use crate::Violation;
use std::collections::{HashMap, hash_map};

/// Maximum number of invalid records collected before parsing gives up.
pub const MAX_ERRORS: usize = 1000;

/// Checks a parsed record, an empty result means valid.
pub trait Validator<E> {
    fn validate(&self, entity: &E) -> Vec<Violation>;
}

impl<E, F> Validator<E> for F
where
    F: Fn(&E) -> Vec<Violation>,
{
    fn validate(&self, entity: &E) -> Vec<Violation> {
        self(entity)
    }
}

/// Violations of the rejected records, keyed by their raw line.
///
/// Inserting the same line twice keeps the last violations.
#[derive(Debug, Clone)]
pub struct ValidationErrors {
    entries: HashMap<String, Vec<Violation>>,
    limit: usize,
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new(MAX_ERRORS)
    }
}

impl ValidationErrors {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Records the violations of `line`. Returns true once the set holds
    /// `limit` entries, at which point the caller must stop.
    pub fn insert(&mut self, line: String, violations: Vec<Violation>) -> bool {
        self.entries.insert(line, violations);
        self.entries.len() >= self.limit
    }

    pub fn get(&self, line: &str) -> Option<&[Violation]> {
        self.entries.get(line).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Vec<Violation>> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<Violation>> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = (&'a String, &'a Vec<Violation>);
    type IntoIter = hash_map::Iter<'a, String, Vec<Violation>>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_is_reached_on_the_last_slot() {
        let mut errors = ValidationErrors::new(3);
        assert!(!errors.insert("a".into(), vec![Violation::new("f", "bad")]));
        assert!(!errors.insert("a".into(), vec![Violation::new("g", "bad")]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("a").unwrap()[0].field, "g");
        assert!(!errors.insert("b".into(), vec![]));
        assert!(errors.insert("c".into(), vec![]));
    }
}
