/// Round-robin selector over a list of API keys.
///
/// Not synchronized: the owner calls `next_key` from a single task.
#[derive(Debug, Clone, Default)]
pub struct KeyRotator {
    keys: Vec<String>,
    next: usize,
}

impl KeyRotator {
    /// Blank keys are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            next: 0,
        }
    }

    /// Returns the current key and moves to the next one, wrapping around.
    pub fn next_key(&mut self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = self.next % self.keys.len();
        self.next = (idx + 1) % self.keys.len();
        Some(self.keys[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotates_round_robin() {
        let mut keys = KeyRotator::new(["a", "b", "c"]);
        let seen: Vec<String> = (0..5).map(|_| keys.next_key().unwrap().to_string()).collect();
        assert_eq!(seen, vec!["a", "b", "c", "a", "b"]);
    }

    #[test]
    fn test_empty_rotator_yields_none() {
        let mut keys = KeyRotator::new(["", "  "]);
        assert!(keys.is_empty());
        assert_eq!(keys.next_key(), None);
    }
}
