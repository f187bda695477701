use serde::{Deserialize, Serialize};

/// Channel names a dApp may use from its parent scope
///
/// Order is not significant; duplicates are tolerated and collapse in
/// `union`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Boundary {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

impl Boundary {
    pub fn new<I, O>(input: I, output: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            output: output.into_iter().map(Into::into).collect(),
        }
    }

    /// Input followed by output, first occurrence wins
    pub fn union(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.input.len() + self.output.len());
        for name in self.input.iter().chain(self.output.iter()) {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        out
    }

    pub fn contains(&self, name: &str) -> bool {
        self.input.iter().chain(self.output.iter()).any(|b| b == name)
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_dedupes_preserving_order() {
        let b = Boundary::new(["a", "b"], ["b", "c"]);
        assert_eq!(b.union(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_contains_checks_both_sides() {
        let b = Boundary::new(["in"], ["out"]);
        assert!(b.contains("in"));
        assert!(b.contains("out"));
        assert!(!b.contains("other"));
        assert!(Boundary::default().is_empty());
    }
}
