use std::collections::HashSet;

/// Unique record ids in insertion order, stored as a comma-joined string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a persisted value, dropping empty entries and repeats.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').collect()
    }

    pub fn to_storage_string(&self) -> String {
        self.ids.join(",")
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    pub fn insert(&mut self, id: &str) -> bool {
        if id.is_empty() || self.index.contains(id) {
            return false;
        }
        self.index.insert(id.to_string());
        self.ids.push(id.to_string());
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if !self.index.remove(id) {
            return false;
        }
        self.ids.retain(|existing| existing != id);
        true
    }

    /// Sets membership of `id`; returns whether anything changed.
    pub fn set(&mut self, id: &str, member: bool) -> bool {
        if member {
            self.insert(id)
        } else {
            self.remove(id)
        }
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

impl<'a> FromIterator<&'a str> for IdSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = IdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_empty_entries_and_duplicates() {
        let set = IdSet::parse("3,,1,3,2,");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["3", "1", "2"]);
        assert_eq!(set.to_storage_string(), "3,1,2");
        assert!(IdSet::parse("").is_empty());
    }

    #[test]
    fn set_and_unset_report_changes() {
        let mut set = IdSet::parse("a");
        assert!(set.set("b", true));
        assert!(!set.set("b", true));
        assert!(set.set("a", false));
        assert!(!set.set("a", false));
        assert_eq!(set.to_storage_string(), "b");
        assert!(!set.contains("a"));
    }
}
