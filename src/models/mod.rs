// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod station;
pub mod user;
pub mod visited;

pub use station::Station;
pub use user::{Account, Registration, SignUp, User};
pub use visited::{NewVisit, Review, VisitLookup, Visited, VisitedStation};

use serde::{Deserialize, Serialize};

/// A relationship attribute: the server sends either the related
/// document's ID or the expanded document itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    Id(String),
    Document(Box<T>),
}

/// Documents that carry a `$id`.
pub trait HasId {
    fn document_id(&self) -> &str;
}

impl HasId for User {
    fn document_id(&self) -> &str {
        &self.id
    }
}

impl HasId for Station {
    fn document_id(&self) -> &str {
        &self.id
    }
}

impl<T: HasId> Related<T> {
    pub fn id(&self) -> &str {
        match self {
            Related::Id(id) => id,
            Related::Document(doc) => doc.document_id(),
        }
    }

    pub fn document(&self) -> Option<&T> {
        match self {
            Related::Id(_) => None,
            Related::Document(doc) => Some(doc),
        }
    }
}
