// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document list queries.
//!
//! Each query is sent as one `queries[]` parameter holding a JSON object
//! such as `{"method":"equal","attribute":"creator","values":["u1"]}`.

use serde::Serialize;
use serde_json::Value;

/// A single list-documents query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

impl Query {
    fn new(method: &'static str, attribute: Option<&str>, values: Vec<Value>) -> Self {
        Self {
            method,
            attribute: attribute.map(str::to_string),
            values,
        }
    }

    /// Attribute equals one of `values`.
    pub fn equal<V: Into<Value>>(attribute: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            "equal",
            Some(attribute),
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// Full-text search on an indexed attribute.
    pub fn search(attribute: &str, text: &str) -> Self {
        Self::new("search", Some(attribute), vec![text.into()])
    }

    pub fn order_desc(attribute: &str) -> Self {
        Self::new("orderDesc", Some(attribute), Vec::new())
    }

    pub fn limit(limit: u32) -> Self {
        Self::new("limit", None, vec![limit.into()])
    }

    /// Skip the first `offset` matches.
    pub fn offset(offset: u64) -> Self {
        Self::new("offset", None, vec![offset.into()])
    }

    /// Encoded form used as a `queries[]` parameter.
    pub fn to_param(&self) -> String {
        // Serializing a struct of strings and JSON values cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
