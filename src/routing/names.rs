//! Route name registry.
//!
//! Owned by a single collection, so independently built route tables
//! never see each other's names.

use std::collections::HashMap;

use crate::routing::types::{RouteError, RouteResult};

/// Maps unique route names to registry positions.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    names: HashMap<String, usize>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name` for the route at `index`.
    pub fn claim(&mut self, name: &str, index: usize) -> RouteResult<()> {
        if self.names.contains_key(name) {
            return Err(RouteError::DuplicateName(name.to_string()));
        }
        self.names.insert(name.to_string(), index);
        Ok(())
    }

    /// Give a name back, e.g. when a route is renamed.
    pub fn release(&mut self, name: &str) -> Option<usize> {
        self.names.remove(name)
    }

    /// Registry position of the route called `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_conflict() {
        let mut names = NameRegistry::new();
        names.claim("user.show", 0).unwrap();

        let err = names.claim("user.show", 1).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateName(name) if name == "user.show"));
        assert_eq!(names.get("user.show"), Some(0));
    }

    #[test]
    fn test_release() {
        let mut names = NameRegistry::new();
        names.claim("home", 3).unwrap();
        assert_eq!(names.release("home"), Some(3));
        assert!(names.is_empty());
        names.claim("home", 4).unwrap();
        assert_eq!(names.get("home"), Some(4));
    }
}
