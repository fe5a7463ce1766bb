use std::collections::HashMap;

/// Display name to id resolution table.
///
/// Rebuilt in full from each bulk index; between rebuilds it only grows,
/// and names learned from detail records never remap an existing name.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    names: Vec<String>,
    by_name: HashMap<String, String>,
}

impl NameIndex {
    /// Build from `(name, id)` pairs in bulk-index order.
    ///
    /// Every name is listed, duplicates included. A duplicated name (Meraki
    /// lists Arena variants under the base item's name) resolves to the last
    /// id seen.
    pub fn rebuild<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut index = Self::default();
        for (name, id) in pairs {
            index.by_name.insert(name.to_string(), id.to_string());
            index.names.push(name.to_string());
        }
        index
    }

    /// Add a name unknown to the index. Returns true when the pair was added.
    pub fn insert_if_absent(&mut self, name: &str, id: &str) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name.to_string(), id.to_string());
        self.names.push(name.to_string());
        true
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Names in insertion order, duplicates included
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
