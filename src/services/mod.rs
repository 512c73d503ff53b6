// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the façade operations.

pub mod accounts;
pub mod stations;
pub mod visits;

pub use accounts::AccountService;
pub use stations::StationService;
pub use visits::{VisitCollections, VisitService};
