// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Station listing, search and lookup.

use crate::db::{attributes, AppwriteDb, DocumentList, Query};
use crate::error::{AppError, Result};
use crate::models::Station;
use crate::session::Session;

/// Read-only access to the stations collection.
#[derive(Clone)]
pub struct StationService {
    db: AppwriteDb,
    stations_collection: String,
    list_limit: u32,
}

impl StationService {
    pub fn new(db: AppwriteDb, stations_collection: impl Into<String>, list_limit: u32) -> Self {
        Self {
            db,
            stations_collection: stations_collection.into(),
            list_limit,
        }
    }

    /// All stations, newest first. Listings larger than one page are
    /// fetched page by page.
    pub async fn get_all_posts(&self, session: &Session) -> Result<Vec<Station>> {
        let list: DocumentList<Station> = self
            .db
            .list_all_documents(
                session,
                &self.stations_collection,
                &[Query::order_desc(attributes::CREATED_AT)],
                self.list_limit,
            )
            .await
            .map_err(|e| e.fetch_failed("get_all_posts"))?;

        let mut stations = list.documents;
        // Stable, so equal timestamps keep the server's order.
        stations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(count = stations.len(), total = list.total, "Listed stations");
        Ok(stations)
    }

    /// Stations whose title matches a full-text query.
    ///
    /// A blank query matches nothing and costs no round trip.
    pub async fn search_posts(&self, session: &Session, query: &str) -> Result<Vec<Station>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let list: DocumentList<Station> = self
            .db
            .list_all_documents(
                session,
                &self.stations_collection,
                &[Query::search(attributes::TITLE, query)],
                self.list_limit,
            )
            .await
            .map_err(|e| e.fetch_failed("search_posts"))?;

        tracing::debug!(query, count = list.documents.len(), "Searched stations");
        Ok(list.documents)
    }

    /// Get a station by ID.
    pub async fn get_stations_by_id(&self, session: &Session, station_id: &str) -> Result<Station> {
        if station_id.trim().is_empty() {
            return Err(AppError::NotFound("Station id is empty".to_string()));
        }

        self.db
            .get_document(session, &self.stations_collection, station_id)
            .await
            .map_err(|e| e.fetch_failed("get_stations_by_id"))
    }

    /// Displayable thumbnail URL.
    ///
    /// Thumbnails stored as bucket file IDs are resolved to a view URL;
    /// absolute URLs pass through unchanged.
    pub fn thumbnail_url(&self, station: &Station) -> Option<String> {
        let thumbnail = station.thumbnail.as_deref()?.trim();
        if thumbnail.is_empty() {
            None
        } else if thumbnail.starts_with("http://") || thumbnail.starts_with("https://") {
            Some(thumbnail.to_string())
        } else {
            Some(self.db.file_view_url(thumbnail))
        }
    }
}
