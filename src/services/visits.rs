// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Visit service: recording, listing and deleting visited records.
//!
//! A user's visit history is a scatter-gather join:
//! 1. List the user's visited records (one query)
//! 2. Fetch each visited station (bounded, order-preserving fan-out)
//! 3. Merge each station with its visit date, review and record ID

use crate::db::{attributes, AppwriteDb, DocumentList, Query};
use crate::error::{AppError, Result};
use crate::models::visited::VisitedData;
use crate::models::{NewVisit, Review, Station, User, VisitLookup, Visited, VisitedStation};
use crate::session::Session;
use crate::time_utils::format_utc_millis;
use futures_util::{stream, StreamExt, TryStreamExt};
use std::collections::{BTreeSet, HashMap};
use validator::Validate;

/// Collection IDs the visit service touches.
#[derive(Debug, Clone)]
pub struct VisitCollections {
    pub visited: String,
    pub stations: String,
    pub users: String,
}

/// Operations on visited records.
#[derive(Clone)]
pub struct VisitService {
    db: AppwriteDb,
    collections: VisitCollections,
    list_limit: u32,
    max_concurrent_fetches: usize,
}

impl VisitService {
    pub fn new(
        db: AppwriteDb,
        collections: VisitCollections,
        list_limit: u32,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            db,
            collections,
            list_limit,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    /// Record that a user visited a station.
    pub async fn mark_visited(&self, session: &Session, visit: &NewVisit) -> Result<Visited> {
        visit.validate()?;

        let data = VisitedData {
            date: format_utc_millis(visit.date),
            review: &visit.review,
            creator: &visit.user_id,
            stations_id: &visit.station_id,
        };

        let created: Visited = self
            .db
            .create_document(session, &self.collections.visited, &data)
            .await
            .map_err(|e| e.write_failed("mark_visited"))?;

        tracing::info!(
            visited_id = %created.id,
            user_id = %visit.user_id,
            station_id = %visit.station_id,
            "Visit recorded"
        );

        Ok(created)
    }

    /// A user's visits joined with station details.
    ///
    /// All-or-nothing: if any station fetch fails, the whole call fails.
    pub async fn get_user_visited_stations(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<VisitedStation>> {
        let visits = self.visits_by(session, attributes::CREATOR, user_id).await?;
        let count = visits.len();

        let joined: Vec<VisitedStation> = stream::iter(visits)
            .map(|visit| self.join_station(session, visit))
            .buffered(self.max_concurrent_fetches)
            .try_collect()
            .await?;

        tracing::debug!(user_id, count, "Joined visit history");
        Ok(joined)
    }

    /// Like `get_user_visited_stations`, but a failed station fetch only
    /// marks its own entry.
    pub async fn get_user_visited_stations_partial(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<VisitLookup>> {
        let visits = self.visits_by(session, attributes::CREATOR, user_id).await?;

        let lookups: Vec<VisitLookup> = stream::iter(visits)
            .map(|visit| async move {
                let visited_id = visit.id.clone();
                match self.join_station(session, visit).await {
                    Ok(entry) => VisitLookup::Found(entry),
                    Err(error) => VisitLookup::Failed { visited_id, error },
                }
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        let failed = lookups
            .iter()
            .filter(|lookup| lookup.found().is_none())
            .count();
        if failed > 0 {
            tracing::warn!(user_id, failed, total = lookups.len(), "Partial visit history");
        }

        Ok(lookups)
    }

    /// Delete a visited record. Stations and users are untouched.
    pub async fn remove_visited(&self, session: &Session, visited_id: &str) -> Result<()> {
        if visited_id.trim().is_empty() {
            return Err(AppError::NotFound("Visited id is empty".to_string()));
        }

        self.db
            .delete_document(session, &self.collections.visited, visited_id)
            .await
            .map_err(|e| e.write_failed("remove_visited"))?;

        tracing::info!(visited_id, "Visit removed");
        Ok(())
    }

    /// All reviews of a station, with reviewer display names.
    ///
    /// Reviewers the server did not expand are resolved with one extra query.
    pub async fn get_reviews_by_station_id(
        &self,
        session: &Session,
        station_id: &str,
    ) -> Result<Vec<Review>> {
        let visits = self.visits_by(session, attributes::STATION, station_id).await?;

        let mut names: HashMap<String, String> = HashMap::new();
        let mut unresolved: BTreeSet<&str> = BTreeSet::new();
        for visit in &visits {
            match visit.creator.as_ref().and_then(|c| c.document()) {
                Some(user) => {
                    names.insert(user.id.clone(), user.username.clone());
                }
                None => {
                    if let Some(id) = visit.creator_id() {
                        unresolved.insert(id);
                    }
                }
            }
        }
        unresolved.retain(|id| !names.contains_key(*id));

        if !unresolved.is_empty() {
            let users: DocumentList<User> = self
                .db
                .list_all_documents(
                    session,
                    &self.collections.users,
                    &[Query::equal(attributes::ID, unresolved.iter().copied())],
                    self.list_limit,
                )
                .await
                .map_err(|e| e.fetch_failed("get_reviews_by_station_id"))?;

            names.extend(users.documents.into_iter().map(|u| (u.id, u.username)));
        }

        let reviews = visits
            .iter()
            .map(|visit| {
                let reviewer_id = visit.creator_id().unwrap_or_default().to_string();
                Review {
                    id: visit.id.clone(),
                    reviewer_name: names.get(&reviewer_id).cloned().unwrap_or_default(),
                    reviewer_id,
                    date: visit.date,
                    review: visit.review_text().to_string(),
                }
            })
            .collect();

        Ok(reviews)
    }

    // ─── Helper Methods ──────────────────────────────────────────

    /// List all visited records whose relationship `attribute` points at `id`.
    async fn visits_by(&self, session: &Session, attribute: &str, id: &str) -> Result<Vec<Visited>> {
        let list: DocumentList<Visited> = self
            .db
            .list_all_documents(
                session,
                &self.collections.visited,
                &[Query::equal(attribute, [id])],
                self.list_limit,
            )
            .await
            .map_err(|e| e.fetch_failed("list_visits"))?;

        Ok(list.documents)
    }

    /// Fetch the station a visit points at and merge the two.
    async fn join_station(&self, session: &Session, visit: Visited) -> Result<VisitedStation> {
        let station_id = visit.station_id().ok_or_else(|| {
            AppError::NotFound(format!("Visit {} has no station reference", visit.id))
        })?;

        let station: Station = self
            .db
            .get_document(session, &self.collections.stations, station_id)
            .await
            .map_err(|e| e.fetch_failed("get_user_visited_stations"))?;

        Ok(VisitedStation::new(station, &visit))
    }
}
