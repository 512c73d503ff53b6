// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EV Charging Finder: station data client
//!
//! This crate provides a typed client for discovering EV charging stations
//! and recording "visited" reviews against a hosted document database and
//! session-based account service.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use db::AppwriteDb;
use error::DbError;
use services::{AccountService, StationService, VisitCollections, VisitService};

/// The station data client: one service per concern over a shared
/// remote connection. Cheap to clone.
#[derive(Clone)]
pub struct StationDataClient {
    pub accounts: AccountService,
    pub stations: StationService,
    pub visits: VisitService,
}

impl StationDataClient {
    /// Build a client from configuration. No request is made.
    pub fn new(config: &Config) -> Result<Self, DbError> {
        let db = AppwriteDb::new(config)?;

        Ok(Self {
            accounts: AccountService::new(db.clone(), config.user_collection_id.clone()),
            stations: StationService::new(
                db.clone(),
                config.stations_collection_id.clone(),
                config.list_limit,
            ),
            visits: VisitService::new(
                db,
                VisitCollections {
                    visited: config.visited_collection_id.clone(),
                    stations: config.stations_collection_id.clone(),
                    users: config.user_collection_id.clone(),
                },
                config.list_limit,
                config.max_concurrent_fetches,
            ),
        })
    }
}
