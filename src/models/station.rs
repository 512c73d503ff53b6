// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EV charging station model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A charging station document. Read-only from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "$id")]
    pub id: String,
    pub title: String,
    /// Image URL, or a file ID in the thumbnails bucket
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Website URL
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub operating_hours: Option<String>,
    /// Offered services, in display order
    #[serde(default)]
    pub services: Vec<String>,
    /// Aggregate rating out of 5
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
}
