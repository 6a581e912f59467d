//! Small presentation helpers shared by the HTTP layer

use md5::{Digest, Md5};
use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
};

const GRAVATAR_BASE_URL: &str = "https://www.gravatar.com/avatar";
const GRAVATAR_DEFAULT: &str = "retro";
const GRAVATAR_SIZE: u32 = 100;

/// Human-readable labels for the fields of a record type
pub trait FieldLabels {
    /// Explicit label for `field`, if the type declares one
    fn field_label(field: &str) -> Option<&'static str>;
}

/// Label for a field of `T`, falling back to the field name with underscores as spaces
pub fn verbose_name<T: FieldLabels>(field: &str) -> String {
    T::field_label(field)
        .map(str::to_owned)
        .unwrap_or_else(|| field.replace('_', " "))
}

/// Avatar address for an email: md5 of the trimmed, lowercased address plus fixed display options
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let hash = hex::encode(Md5::digest(normalized.as_bytes()));

    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("d", GRAVATAR_DEFAULT)
        .append_pair("s", &GRAVATAR_SIZE.to_string())
        .finish();

    format!("{GRAVATAR_BASE_URL}/{hash}?{params}")
}

/// True if any of the requested permissions is held
pub fn check_perms_list<S: AsRef<str>>(perms: &HashSet<String>, requested: &[S]) -> bool {
    requested.iter().any(|perm| perms.contains(perm.as_ref()))
}

/// Ordered, multi-valued query string parameters
///
/// Keys keep the position of their first occurrence; repeated keys collect
/// their values in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query string (without the `?`)
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.append(&key, &value);
        }
        params
    }

    /// Adds a value, keeping any existing values for the key
    pub fn append(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_owned()),
            None => self.entries.push((key.to_owned(), vec![value.to_owned()])),
        }
    }

    /// Replaces every value of the key with a single value
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value.to_owned()],
            None => self.entries.push((key.to_owned(), vec![value.to_owned()])),
        }
    }

    /// Removes the key, returning its values if it was present
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Last value of the key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.last())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.entries {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl Display for QueryParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.encode())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key.as_ref(), value.as_ref());
        }
        params
    }
}

/// Encoded query string with the `page` parameter set
pub fn page_url(query: &QueryParams, page: u64) -> String {
    set_query_param(query, "page", &page.to_string()).encode()
}

/// Copy of the parameters with `key` set to a single `value`
pub fn set_query_param(query: &QueryParams, key: &str, value: &str) -> QueryParams {
    let mut params = query.clone();
    params.set(key, value);
    params
}

/// Copy of the parameters without `key`
pub fn delete_query_param(query: &QueryParams, key: &str) -> QueryParams {
    let mut params = query.clone();
    params.remove(key);
    params
}
