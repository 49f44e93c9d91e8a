//! Normalized inbound request

use serde::Serialize;
use std::collections::BTreeMap;

/// Field name to value mapping carried by every request.
pub type Fields = BTreeMap<String, String>;

/// Content type reported for payloads handed over by an embedding host.
pub const HOST_CONTENT_TYPE: &str = "application/x-host-payload";

/// Which input shape was honored for a request. Exactly one source wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    Host,
    Transport,
}

/// Raw pieces of a standard HTTP request.
#[derive(Debug, Clone, Default)]
pub struct TransportInput {
    pub content_type: String,
    pub query_string: String,
    pub body: Vec<u8>,
}

impl TransportInput {
    pub fn new(
        content_type: impl Into<String>,
        query_string: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            query_string: query_string.into(),
            body: body.into(),
        }
    }

    pub fn json(body: &serde_json::Value) -> Self {
        Self::new("application/json", "", body.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRequest {
    fields: Fields,
    content_type: String,
    source: RequestSource,
}

impl NormalizedRequest {
    pub fn new(fields: Fields, content_type: impl Into<String>, source: RequestSource) -> Self {
        Self {
            fields,
            content_type: content_type.into(),
            source,
        }
    }

    /// Body view of the fields.
    pub fn body(&self) -> &Fields {
        &self.fields
    }

    /// Query view of the fields. Same storage as [`Self::body`]; handlers that
    /// look in either place see identical values.
    pub fn query(&self) -> &Fields {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// First non-blank value among `names`, in order.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .find(|value| !value.trim().is_empty())
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn source(&self) -> RequestSource {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
