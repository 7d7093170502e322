//! Canonical response shapes composed from a [`RequestSnapshot`].
//!
//! Every optional field is left out of the JSON when empty: no `null`,
//! no `{}`. Existing clients depend on that.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::snapshot::{FieldMap, FileEntry, HeaderSnapshot, RequestSnapshot};
use crate::synthesis::Codec;

/// Query-only echo (`GET /get`).
#[derive(Debug, Clone, Serialize)]
pub struct ParamEcho {
    #[serde(rename = "arg", skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: FieldMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderSnapshot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
}

impl From<RequestSnapshot> for ParamEcho {
    fn from(snapshot: RequestSnapshot) -> Self {
        Self {
            arguments: snapshot.arguments,
            headers: snapshot.headers,
            ip: origin(snapshot.client_ip),
            url: snapshot.url,
            method: snapshot.method,
        }
    }
}

/// Full echo for requests that carry a body.
#[derive(Debug, Clone, Serialize)]
pub struct BodyEcho {
    #[serde(rename = "arg", skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: FieldMap,
    #[serde(rename = "data", skip_serializing_if = "String::is_empty")]
    pub raw_body: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, FileEntry>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub form: FieldMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderSnapshot,
    #[serde(rename = "json", skip_serializing_if = "Option::is_none")]
    pub parsed_json: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
}

impl From<RequestSnapshot> for BodyEcho {
    fn from(snapshot: RequestSnapshot) -> Self {
        Self {
            arguments: snapshot.arguments,
            raw_body: snapshot.raw_body,
            files: snapshot.files,
            form: snapshot.form,
            headers: snapshot.headers,
            parsed_json: snapshot.parsed_json,
            ip: origin(snapshot.client_ip),
            url: snapshot.url,
            method: snapshot.method,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadersEcho {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct IpEcho {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
}

impl IpEcho {
    pub fn new(client_ip: String) -> Self {
        Self { ip: origin(client_ip) }
    }
}

/// Always carries the key, even for a missing User-Agent.
#[derive(Debug, Clone, Serialize)]
pub struct UserAgentEcho {
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Payload wrapped by the compression endpoints: headers, origin and a
/// codec-specific flag (`gzipped`, `deflated` or `compressed`).
#[derive(Debug, Clone)]
pub struct CompressedEcho {
    pub headers: HeaderSnapshot,
    pub ip: Vec<String>,
    pub codec: Codec,
}

impl CompressedEcho {
    pub fn new(codec: Codec, headers: HeaderSnapshot, client_ip: String) -> Self {
        Self {
            headers,
            ip: origin(client_ip),
            codec,
        }
    }
}

impl Serialize for CompressedEcho {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.headers.is_empty() {
            map.serialize_entry("headers", &self.headers)?;
        }
        if !self.ip.is_empty() {
            map.serialize_entry("ip", &self.ip)?;
        }
        map.serialize_entry(self.codec.flag_name(), &true)?;
        map.end()
    }
}

fn origin(client_ip: String) -> Vec<String> {
    vec![client_ip]
}
