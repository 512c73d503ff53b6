//! Database layer (remote document service).

pub mod appwrite;
pub mod query;

pub use appwrite::{AppwriteDb, DocumentList};
pub use query::Query;

/// Attribute names as constants.
pub mod attributes {
    pub const ID: &str = "$id";
    pub const CREATED_AT: &str = "$createdAt";
    /// Users: linked account ID
    pub const ACCOUNT_ID: &str = "accountId";
    /// Stations: full-text indexed title
    pub const TITLE: &str = "title";
    /// Visited: reviewing user relationship
    pub const CREATOR: &str = "creator";
    /// Visited: station relationship
    pub const STATION: &str = "stationsId";
}
