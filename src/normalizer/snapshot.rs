//! Request-scoped snapshot types.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A query or form value: a scalar when the key was supplied once,
/// the ordered list of values otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl From<Vec<String>> for FieldValue {
    fn from(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            FieldValue::Single(values.remove(0))
        } else {
            FieldValue::Multiple(values)
        }
    }
}

/// Name → value mapping for query arguments and form fields.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Header name → first value.
pub type HeaderSnapshot = BTreeMap<String, String>;

/// Group `(key, value)` pairs by key, keeping client order inside each key.
pub fn collapse<I>(pairs: I) -> FieldMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    grouped
        .into_iter()
        .map(|(key, values)| (key, FieldValue::from(values)))
        .collect()
}

/// Metadata and content of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    #[serde(rename = "Filename")]
    pub filename: String,

    #[serde(rename = "Header")]
    pub headers: HeaderSnapshot,

    #[serde(rename = "Size")]
    pub size: u64,

    #[serde(rename = "Human_Readable_Size")]
    pub human_size: String,

    /// `data:<content-type>;base64,<payload>`
    #[serde(rename = "Content")]
    pub content: String,
}

/// Everything inspectable about one request.
///
/// Built fresh per request by [`Normalizer::normalize`](super::Normalizer::normalize)
/// and dropped once the response is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSnapshot {
    pub arguments: FieldMap,
    /// Multi-valued headers keep only their first value.
    pub headers: HeaderSnapshot,
    pub form: FieldMap,
    /// Repeated file fields keep only the last processed file.
    pub files: BTreeMap<String, FileEntry>,
    pub raw_body: String,
    /// `None` when the body is not JSON (or is JSON `null`).
    pub parsed_json: Option<Value>,
    pub client_ip: String,
    pub url: String,
    pub method: String,
}
