// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Visited (review) records and the shapes derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Related, Station, User};

/// Longest review text accepted for a visit.
pub const MAX_REVIEW_CHARS: u64 = 2000;

/// Stored visited record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visited {
    #[serde(rename = "$id")]
    pub id: String,
    /// Reviewing user
    #[serde(default)]
    pub creator: Option<Related<User>>,
    /// Visited station
    #[serde(rename = "stationsId", default)]
    pub station: Option<Related<Station>>,
    /// When the visit happened
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Visited {
    pub fn station_id(&self) -> Option<&str> {
        self.station.as_ref().map(Related::id)
    }

    pub fn creator_id(&self) -> Option<&str> {
        self.creator.as_ref().map(Related::id)
    }

    pub fn review_text(&self) -> &str {
        self.review.as_deref().unwrap_or_default()
    }
}

/// Input for recording a visit.
#[derive(Debug, Clone, Validate)]
pub struct NewVisit {
    /// Profile document ID of the reviewer
    #[validate(length(min = 1, message = "user id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "station id must not be empty"))]
    pub station_id: String,
    pub date: DateTime<Utc>,
    #[validate(length(max = MAX_REVIEW_CHARS, message = "review is too long"))]
    pub review: String,
}

/// Document body written for a new visit.
#[derive(Debug, Serialize)]
pub(crate) struct VisitedData<'a> {
    pub date: String,
    pub review: &'a str,
    pub creator: &'a str,
    #[serde(rename = "stationsId")]
    pub stations_id: &'a str,
}

/// A station joined with one of the user's visits to it.
#[derive(Debug, Clone, Serialize)]
pub struct VisitedStation {
    #[serde(flatten)]
    pub station: Station,
    #[serde(rename = "visitedDate")]
    pub visited_date: DateTime<Utc>,
    #[serde(rename = "visitedReview")]
    pub visited_review: String,
    #[serde(rename = "visitedId")]
    pub visited_id: String,
}

impl VisitedStation {
    pub fn new(station: Station, visit: &Visited) -> Self {
        Self {
            station,
            visited_date: visit.date,
            visited_review: visit.review_text().to_string(),
            visited_id: visit.id.clone(),
        }
    }
}

/// Outcome of one detail lookup in a partial visit-history join.
#[derive(Debug)]
pub enum VisitLookup {
    Found(VisitedStation),
    Failed {
        visited_id: String,
        error: crate::error::AppError,
    },
}

impl VisitLookup {
    pub fn found(&self) -> Option<&VisitedStation> {
        match self {
            VisitLookup::Found(entry) => Some(entry),
            VisitLookup::Failed { .. } => None,
        }
    }
}

/// A visit shaped for a station's review list.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: String,
    pub reviewer_id: String,
    /// Reviewer's display name; empty if the profile no longer exists
    pub reviewer_name: String,
    pub date: DateTime<Utc>,
    pub review: String,
}
