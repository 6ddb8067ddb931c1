use std::collections::BTreeMap;
use std::collections::btree_map;

/// Header fields of a request or response.
///
/// Names are stored as received (case preserved) and a later insert with the
/// same name overwrites the earlier value; multi-value headers are not kept.
/// Iteration order is the lexical order of names, which keeps the serialized
/// response deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, returning the previous value stored under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.inner.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    /// Looks a header up ignoring ASCII case, the way framing headers are read.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.find_ignore_case(name).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.find_ignore_case(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.remove(name)
    }

    /// Removes every header whose name matches `name` ignoring ASCII case.
    pub fn remove_ignore_case(&mut self, name: &str) {
        self.inner.retain(|key, _| !key.eq_ignore_ascii_case(name));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.inner.iter()
    }

    fn find_ignore_case(&self, name: &str) -> Option<(&String, &String)> {
        self.inner.get_key_value(name).or_else(|| self.inner.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_overwrites() {
        let mut headers = Headers::new();
        assert_eq!(headers.insert("Accept", "text/html"), None);
        assert_eq!(headers.insert("Accept", "*/*"), Some("text/html".into()));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Accept"), Some("*/*"));
    }

    #[test]
    fn names_are_case_sensitive() {
        let headers: Headers = [("content-length", "3")].into_iter().collect();
        assert_eq!(headers.get("Content-Length"), None);
        assert!(!headers.contains("Content-Length"));
        assert_eq!(headers.get_ignore_case("Content-Length"), Some("3"));
        assert!(headers.contains_ignore_case("CONTENT-LENGTH"));
    }

    #[test]
    fn remove_ignore_case() {
        let mut headers: Headers = [("content-length", "3"), ("Content-Length", "4"), ("Host", "a")].into_iter().collect();
        headers.remove_ignore_case("Content-Length");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Host"), Some("a"));
    }
}
