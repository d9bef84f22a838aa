//! Parsed bibliography records

use std::collections::BTreeMap;

/// Pseudo-field addressing the citation key
pub const ID_FIELD: &str = "ID";

/// Pseudo-field addressing the entry type
pub const ENTRY_TYPE_FIELD: &str = "ENTRYTYPE";

/// One `@type{key, field = value, ...}` record.
///
/// Entry type and field names are stored lowercase; the citation key keeps
/// its case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BibEntry {
    key: String,
    entry_type: String,
    fields: BTreeMap<String, String>,
}

impl BibEntry {
    /// Create an entry without fields
    pub fn new<K: Into<String>, T: AsRef<str>>(key: K, entry_type: T) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.as_ref().to_lowercase(),
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a field
    pub fn with_field<N: AsRef<str>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field; a later value for the same name wins
    pub fn set<N: AsRef<str>, V: Into<String>>(&mut self, name: N, value: V) {
        self.fields
            .insert(name.as_ref().to_lowercase(), value.into());
    }

    /// Citation key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entry type, lowercase (`article`, `book`, ...)
    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// Look up a field, with `""` for missing ones.
    ///
    /// [`ID_FIELD`] and [`ENTRY_TYPE_FIELD`] return the key and the type;
    /// other names are matched case-insensitively.
    pub fn get(&self, name: &str) -> &str {
        match name {
            ID_FIELD => &self.key,
            ENTRY_TYPE_FIELD => &self.entry_type,
            _ => self
                .fields
                .get(&name.to_lowercase())
                .map_or("", String::as_str),
        }
    }

    /// Iterate over the regular fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_with_defaults() {
        let entry = BibEntry::new("Smith2020", "ARTICLE")
            .with_field("Title", "A study")
            .with_field("pages", "1--2");

        assert_eq!(entry.get(ID_FIELD), "Smith2020");
        assert_eq!(entry.get(ENTRY_TYPE_FIELD), "article");
        assert_eq!(entry.get("title"), "A study");
        assert_eq!(entry.get("TITLE"), "A study");
        assert_eq!(entry.get("doi"), "");
    }

    #[test]
    fn test_later_field_wins() {
        let mut entry = BibEntry::new("k", "misc");
        entry.set("year", "1999");
        entry.set("YEAR", "2000");
        assert_eq!(entry.fields().collect::<Vec<_>>(), vec![("year", "2000")]);
    }
}
