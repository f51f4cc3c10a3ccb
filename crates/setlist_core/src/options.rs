use std::collections::BTreeSet;

/// Set of enabled creation option identifiers (e.g. `strict-search`).
///
/// The server only cares about membership. Iteration and the comma-joined
/// forms are sorted so that repeated saves of the same set are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionSet {
    ids: BTreeSet<String>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-joined list, ignoring blank tokens and surrounding whitespace.
    pub fn from_comma_joined(raw: &str) -> Self {
        raw.split(',').collect()
    }

    pub fn to_comma_joined(&self) -> String {
        self.ids.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for OptionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}
