/// An ordered list of name / value pairs used in HTTP headers.
///
/// Names are stored exactly as written and writes match them exactly, so `X-Trace` and
/// `x-trace` are two entries. Lookups compare names ASCII case-insensitively. Iteration
/// yields entries in insertion order so that serialization is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Returns an empty `Headers` struct.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts a new entry into the Headers struct by passing both key and value.
    ///
    /// If an entry with exactly the same name already exists, its value is replaced in
    /// place and it keeps its position. A name differing only in case is a new entry.
    /// There is no multi-value merging.
    ///
    /// # Examples
    /// ```
    /// let mut headers = radix_http::http::headers::Headers::new();
    /// headers.insert("Drink", "milk");
    /// headers.insert("Drink", "tea");
    /// headers.insert("drink", "water");
    /// assert_eq!(headers.get("DRINK"), Some("water"));
    /// assert_eq!(headers.len(), 2);
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some((_, existing)) = self.0.iter_mut().find(|(name, _)| *name == key) {
            *existing = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Retrieves the value of a specified key.
    ///
    /// Names are compared ASCII case-insensitively; when several entries match, the one
    /// inserted last wins. Returns None if the specified key was not found in the header.
    ///
    /// # Examples
    /// ```
    /// let mut headers = radix_http::http::headers::Headers::new();
    /// headers.insert("Content-Type", "text/plain");
    /// assert_eq!(headers.get("content-type"), Some("text/plain"));
    /// assert_eq!(headers.get("accept"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the length of the Headers, that being the raw amount of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses a single header line and records it.
    ///
    /// The line is split on its first colon and both sides are trimmed. Returns `false`
    /// and leaves the map untouched when the line has no colon or an empty name, so
    /// the caller can drop the line and keep reading.
    pub fn parse_header_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.split_once(':') else {
            return false;
        };

        let key = key.trim();
        if key.is_empty() {
            return false;
        }

        self.insert(key, value.trim());
        true
    }
}
