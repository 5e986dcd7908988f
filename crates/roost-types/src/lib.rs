//! Shared domain records for the Roost rental platform.
//!
//! This crate provides the plain data types passed between the data-access
//! layer and its callers: user accounts, rental listings, reservations, and
//! the optional search filters. No crate in the workspace depends on
//! anything *except* `roost-types` for cross-cutting type definitions,
//! which keeps the dependency graph clean and prevents circular
//! dependencies.
//!
//! Monetary values are stored in minor currency units (cents) as integers;
//! timestamps and dates are ISO 8601 strings, matching the column types in
//! the database schema.

use serde::{Deserialize, Serialize};

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Database-generated identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email, unique across accounts.
    pub email: String,
    /// Stored password credential. Hashing is the surrounding
    /// application's responsibility; this layer stores the value as given.
    pub password: String,
}

/// Insert shape for a new user. The identifier is database-generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A rental listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Database-generated identifier.
    pub id: i64,
    /// ID of the owning user.
    pub owner_id: i64,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Thumbnail image URL; empty string when the listing has none.
    pub thumbnail_photo_url: String,
    /// Cover image URL; empty string when the listing has none.
    pub cover_photo_url: String,
    /// Nightly cost in minor currency units (cents).
    pub cost_per_night: i64,
    /// Street address.
    pub street: String,
    /// City.
    pub city: String,
    /// Province or state.
    pub province: String,
    /// Postal code.
    pub post_code: String,
    /// Country.
    pub country: String,
    /// Number of parking spaces.
    pub parking_spaces: i64,
    /// Number of bathrooms.
    pub number_of_bathrooms: i64,
    /// Number of bedrooms.
    pub number_of_bedrooms: i64,
}

/// Insert shape for a new property. The identifier is database-generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    /// Stored as an empty string when absent, never NULL.
    pub thumbnail_photo_url: Option<String>,
    /// Stored as an empty string when absent, never NULL.
    pub cover_photo_url: Option<String>,
    /// Nightly cost in minor currency units (cents).
    pub cost_per_night: i64,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub country: String,
    pub parking_spaces: i64,
    pub number_of_bathrooms: i64,
    pub number_of_bedrooms: i64,
}

/// A property search result: the listing plus its aggregated review score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyListing {
    /// The listing itself.
    pub property: Property,
    /// Average review rating, `None` when the property has no reviews yet.
    pub average_rating: Option<f64>,
}

/// A guest's reservation joined to the property it books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestStay {
    /// Database-generated reservation identifier.
    pub reservation_id: i64,
    /// First night of the stay (ISO 8601 date).
    pub start_date: String,
    /// Last night of the stay (ISO 8601 date).
    pub end_date: String,
    /// ID of the guest who booked the stay.
    pub guest_id: i64,
    /// The reserved property.
    pub property: Property,
}

/// Optional filters for a property search.
///
/// Absent fields apply no constraint; present fields are combined with
/// AND. Price bounds are expressed in MAJOR currency units (dollars) and
/// only take effect when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyFilters {
    /// Substring match against the city name.
    pub city: Option<String>,
    /// Exact match against the owning user.
    pub owner_id: Option<i64>,
    /// Lower nightly-cost bound in major units; ignored without the upper bound.
    pub minimum_price_per_night: Option<i64>,
    /// Upper nightly-cost bound in major units; ignored without the lower bound.
    pub maximum_price_per_night: Option<i64>,
    /// Minimum average review rating, applied after aggregation.
    pub minimum_rating: Option<f64>,
}

impl PropertyFilters {
    /// Returns true when no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.owner_id.is_none()
            && self.minimum_price_per_night.is_none()
            && self.maximum_price_per_night.is_none()
            && self.minimum_rating.is_none()
    }
}
