//! Field extractors for query strings, headers and raw bodies.

use axum::http::HeaderMap;
use serde_json::Value;

use super::snapshot::{collapse, FieldMap, HeaderSnapshot};

/// Parse a query string into arguments.
pub fn extract_arguments(query: Option<&str>) -> FieldMap {
    let Some(query) = query else {
        return FieldMap::new();
    };
    collapse(
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned())),
    )
}

/// Collapse headers to their first value, keyed by canonical name.
pub fn extract_headers(headers: &HeaderMap) -> HeaderSnapshot {
    headers
        .keys()
        .filter_map(|name| {
            let value = headers.get(name)?;
            Some((
                canonical_header_name(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            ))
        })
        .collect()
}

/// `content-type` → `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Best-effort JSON parse of a request body.
pub fn extract_json(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON");
            None
        }
    }
}

/// Size in SI units: `512 B`, `1.5 kB`, `82 MB`.
pub fn human_bytes(size: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
    if size < 10 {
        return format!("{} B", size);
    }
    let exponent = ((size as f64).log10() / 3.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = ((size as f64) / 1000f64.powi(exponent as i32) * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{:.1} {}", value, UNITS[exponent])
    } else {
        format!("{:.0} {}", value, UNITS[exponent])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::snapshot::FieldValue;
    use axum::http::HeaderValue;

    #[test]
    fn arguments_decode_and_group() {
        let args = extract_arguments(Some("name=a+b&tag=x&tag=y&empty"));
        assert_eq!(args["name"], FieldValue::Single("a b".into()));
        assert_eq!(
            args["tag"],
            FieldValue::Multiple(vec!["x".into(), "y".into()])
        );
        assert_eq!(args["empty"], FieldValue::Single(String::new()));
        assert!(extract_arguments(None).is_empty());
    }

    #[test]
    fn repeated_header_keeps_first_value() {
        let mut headers = HeaderMap::new();
        headers.append("x-trace", HeaderValue::from_static("first"));
        headers.append("x-trace", HeaderValue::from_static("second"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let snapshot = extract_headers(&headers);
        assert_eq!(snapshot["X-Trace"], "first");
        assert_eq!(snapshot["User-Agent"], "curl/8.0");
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_header_name("x-forwarded-for"), "X-Forwarded-For");
        assert_eq!(canonical_header_name("ACCEPT"), "Accept");
        assert_eq!(canonical_header_name("dnt"), "Dnt");
    }

    #[test]
    fn json_failures_are_swallowed() {
        assert_eq!(extract_json(br#"{"a": 1}"#), Some(serde_json::json!({"a": 1})));
        assert_eq!(extract_json(b"{not json"), None);
        assert_eq!(extract_json(b"null"), None);
        assert_eq!(extract_json(b""), None);
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(9), "9 B");
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1500), "1.5 kB");
        assert_eq!(human_bytes(82_854_982), "83 MB");
    }
}
