//! Property search and creation.
//!
//! `search_properties` is the one operation with branching logic: it
//! assembles WHERE clauses and positional parameters from whichever
//! optional filters are present, then appends the aggregation, rating
//! filter, ordering, and row cap.

use roost_types::{NewProperty, Property, PropertyFilters, PropertyListing};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use crate::StoreError;

/// Column list shared by every query that reads full property rows.
/// Qualified so it stays unambiguous inside joins.
pub(crate) const PROPERTY_COLUMNS: &str = "properties.id, properties.owner_id, \
     properties.title, properties.description, properties.thumbnail_photo_url, \
     properties.cover_photo_url, properties.cost_per_night, properties.street, \
     properties.city, properties.province, properties.post_code, properties.country, \
     properties.parking_spaces, properties.number_of_bathrooms, properties.number_of_bedrooms";

/// Searches listings against the optional filters, returning at most
/// `limit` rows ordered by ascending nightly cost.
///
/// Present filters combine with AND:
/// - `city` is a substring match (LIKE with wildcards on both sides);
/// - `owner_id` is an exact match;
/// - the price bounds apply only when BOTH are present, and are converted
///   from major to minor currency units before comparison;
/// - `minimum_rating` compares against the per-property average and so
///   lives in a HAVING clause, after the GROUP BY.
///
/// Properties without reviews surface with `average_rating: None`; an
/// absent average never satisfies a minimum-rating filter, so such
/// listings are excluded exactly when that filter is present.
pub fn search_properties(
    conn: &Connection,
    filters: &PropertyFilters,
    limit: i64,
) -> Result<Vec<PropertyListing>, StoreError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params_list: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(city) = &filters.city {
        params_list.push(Box::new(format!("%{city}%")));
        clauses.push(format!("properties.city LIKE ?{}", params_list.len()));
    }

    if let Some(owner_id) = filters.owner_id {
        params_list.push(Box::new(owner_id));
        clauses.push(format!("properties.owner_id = ?{}", params_list.len()));
    }

    // A lone bound applies no price filter; both are required.
    if let (Some(min), Some(max)) = (
        filters.minimum_price_per_night,
        filters.maximum_price_per_night,
    ) {
        params_list.push(Box::new(min * 100));
        params_list.push(Box::new(max * 100));
        clauses.push(format!(
            "properties.cost_per_night BETWEEN ?{} AND ?{}",
            params_list.len() - 1,
            params_list.len()
        ));
    }

    let mut sql = format!(
        "SELECT {PROPERTY_COLUMNS}, avg(property_reviews.rating) AS average_rating \
         FROM properties \
         LEFT JOIN property_reviews ON property_reviews.property_id = properties.id"
    );

    // Whether a clause is the first is decided by its position in the
    // list, never by inspecting the text built so far.
    for (i, clause) in clauses.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(clause);
    }

    sql.push_str(" GROUP BY properties.id");

    // The rating filter constrains the aggregate, so it must come after
    // the GROUP BY.
    if let Some(minimum_rating) = filters.minimum_rating {
        params_list.push(Box::new(minimum_rating));
        sql.push_str(&format!(
            " HAVING avg(property_reviews.rating) >= ?{}",
            params_list.len()
        ));
    }

    params_list.push(Box::new(limit));
    sql.push_str(&format!(
        " ORDER BY properties.cost_per_night ASC LIMIT ?{}",
        params_list.len()
    ));

    tracing::debug!(
        filter_clauses = clauses.len(),
        rating_filter = filters.minimum_rating.is_some(),
        limit,
        "searching properties"
    );

    let mut stmt = conn.prepare(&sql)?;
    let bound: Vec<&dyn ToSql> = params_list.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(bound.as_slice(), |row| {
        Ok(PropertyListing {
            property: property_from_row(row, 0)?,
            average_rating: row.get(15)?,
        })
    })?;

    let mut listings = Vec::new();
    for row in rows {
        listings.push(row?);
    }
    Ok(listings)
}

/// Inserts a new listing and returns the stored row, including the
/// database-generated id.
///
/// Absent photo URLs are stored as empty strings, never NULL. Numeric
/// ranges and the existence of `owner_id` are the database's concern; a
/// dangling owner fails its foreign-key constraint and propagates.
pub fn add_property(conn: &Connection, property: &NewProperty) -> Result<Property, StoreError> {
    let created = conn.query_row(
        "INSERT INTO properties (
            owner_id, title, description, thumbnail_photo_url, cover_photo_url,
            cost_per_night, street, city, province, post_code, country,
            parking_spaces, number_of_bathrooms, number_of_bedrooms
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        RETURNING id, owner_id, title, description, thumbnail_photo_url,
            cover_photo_url, cost_per_night, street, city, province, post_code,
            country, parking_spaces, number_of_bathrooms, number_of_bedrooms",
        params![
            property.owner_id,
            property.title,
            property.description,
            property.thumbnail_photo_url.as_deref().unwrap_or(""),
            property.cover_photo_url.as_deref().unwrap_or(""),
            property.cost_per_night,
            property.street,
            property.city,
            property.province,
            property.post_code,
            property.country,
            property.parking_spaces,
            property.number_of_bathrooms,
            property.number_of_bedrooms,
        ],
        |row| property_from_row(row, 0),
    )?;
    Ok(created)
}

/// Maps the fifteen property columns starting at `offset` within a row.
pub(crate) fn property_from_row(row: &Row, offset: usize) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get(offset)?,
        owner_id: row.get(offset + 1)?,
        title: row.get(offset + 2)?,
        description: row.get(offset + 3)?,
        thumbnail_photo_url: row.get(offset + 4)?,
        cover_photo_url: row.get(offset + 5)?,
        cost_per_night: row.get(offset + 6)?,
        street: row.get(offset + 7)?,
        city: row.get(offset + 8)?,
        province: row.get(offset + 9)?,
        post_code: row.get(offset + 10)?,
        country: row.get(offset + 11)?,
        parking_spaces: row.get(offset + 12)?,
        number_of_bathrooms: row.get(offset + 13)?,
        number_of_bedrooms: row.get(offset + 14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::add_user;
    use roost_db::run_migrations;
    use roost_types::NewUser;
    use rusqlite::Connection;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        // Pooled connections get this from create_pool; a raw test
        // connection must opt in itself.
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("failed to enable foreign keys");
        run_migrations(&conn).expect("failed to run migrations");
        conn
    }

    fn seed_owner(conn: &Connection, email: &str) -> i64 {
        add_user(
            conn,
            &NewUser {
                name: "Owner".to_string(),
                email: email.to_string(),
                password: "pw".to_string(),
            },
        )
        .expect("failed to insert owner")
        .id
    }

    fn new_property(owner_id: i64, city: &str, cost_cents: i64) -> NewProperty {
        NewProperty {
            owner_id,
            title: format!("{city} listing"),
            description: "A place to stay".to_string(),
            thumbnail_photo_url: None,
            cover_photo_url: None,
            cost_per_night: cost_cents,
            street: "123 Main St".to_string(),
            city: city.to_string(),
            province: "BC".to_string(),
            post_code: "V5K 0A1".to_string(),
            country: "Canada".to_string(),
            parking_spaces: 1,
            number_of_bathrooms: 1,
            number_of_bedrooms: 2,
        }
    }

    fn add_review(conn: &Connection, guest_id: i64, property_id: i64, rating: i64) {
        conn.execute(
            "INSERT INTO property_reviews (guest_id, property_id, rating) VALUES (?1, ?2, ?3)",
            params![guest_id, property_id, rating],
        )
        .expect("failed to insert review");
    }

    #[test]
    fn add_property_defaults_absent_photo_urls_to_empty_string() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");

        let mut property = new_property(owner, "Vancouver", 12_000);
        property.cover_photo_url = Some("https://img.example.com/cover.jpg".to_string());

        let created = add_property(&conn, &property).expect("insert failed");
        assert!(created.id > 0);
        assert_eq!(created.thumbnail_photo_url, "");
        assert_eq!(
            created.cover_photo_url,
            "https://img.example.com/cover.jpg"
        );
        assert_eq!(created.cost_per_night, 12_000);
    }

    #[test]
    fn add_property_with_dangling_owner_is_an_error() {
        let conn = setup_db();
        let err = add_property(&conn, &new_property(42, "Vancouver", 12_000))
            .expect_err("dangling owner_id should be rejected");
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn search_without_filters_orders_by_cost_and_caps_rows() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        add_property(&conn, &new_property(owner, "Calgary", 30_000)).expect("insert failed");
        add_property(&conn, &new_property(owner, "Halifax", 10_000)).expect("insert failed");
        add_property(&conn, &new_property(owner, "Toronto", 20_000)).expect("insert failed");

        let listings = search_properties(&conn, &PropertyFilters::default(), 2)
            .expect("search failed");
        let costs: Vec<i64> = listings
            .iter()
            .map(|l| l.property.cost_per_night)
            .collect();
        assert_eq!(costs, vec![10_000, 20_000]);
    }

    #[test]
    fn search_city_filter_matches_substrings() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        add_property(&conn, &new_property(owner, "Vancouver", 10_000)).expect("insert failed");
        add_property(&conn, &new_property(owner, "North Vancouver", 12_000))
            .expect("insert failed");
        add_property(&conn, &new_property(owner, "Toronto", 14_000)).expect("insert failed");

        let filters = PropertyFilters {
            city: Some("ancouv".to_string()),
            ..Default::default()
        };
        let listings = search_properties(&conn, &filters, 10).expect("search failed");
        assert_eq!(listings.len(), 2);
        assert!(listings
            .iter()
            .all(|l| l.property.city.contains("Vancouver")));
    }

    #[test]
    fn search_owner_filter_matches_exactly() {
        let conn = setup_db();
        let first = seed_owner(&conn, "first@example.com");
        let second = seed_owner(&conn, "second@example.com");
        add_property(&conn, &new_property(first, "Vancouver", 10_000)).expect("insert failed");
        add_property(&conn, &new_property(second, "Vancouver", 12_000)).expect("insert failed");

        let filters = PropertyFilters {
            owner_id: Some(second),
            ..Default::default()
        };
        let listings = search_properties(&conn, &filters, 10).expect("search failed");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].property.owner_id, second);
    }

    #[test]
    fn search_price_bounds_convert_major_units_to_cents() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        add_property(&conn, &new_property(owner, "Cheap", 4_900)).expect("insert failed");
        add_property(&conn, &new_property(owner, "Low", 5_000)).expect("insert failed");
        add_property(&conn, &new_property(owner, "High", 15_000)).expect("insert failed");
        add_property(&conn, &new_property(owner, "Steep", 15_100)).expect("insert failed");

        let filters = PropertyFilters {
            minimum_price_per_night: Some(50),
            maximum_price_per_night: Some(150),
            ..Default::default()
        };
        let listings = search_properties(&conn, &filters, 10).expect("search failed");
        let costs: Vec<i64> = listings
            .iter()
            .map(|l| l.property.cost_per_night)
            .collect();
        assert_eq!(costs, vec![5_000, 15_000], "bounds are inclusive, in cents");
    }

    #[test]
    fn search_single_price_bound_applies_no_filter() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        add_property(&conn, &new_property(owner, "Cheap", 1_000)).expect("insert failed");
        add_property(&conn, &new_property(owner, "Steep", 99_000)).expect("insert failed");

        let filters = PropertyFilters {
            minimum_price_per_night: Some(50),
            ..Default::default()
        };
        let listings = search_properties(&conn, &filters, 10).expect("search failed");
        assert_eq!(listings.len(), 2, "a lone bound must be ignored");
    }

    #[test]
    fn search_minimum_rating_filters_the_average_after_grouping() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        let guest = seed_owner(&conn, "guest@example.com");

        let liked = add_property(&conn, &new_property(owner, "Liked", 10_000))
            .expect("insert failed");
        add_review(&conn, guest, liked.id, 5);
        add_review(&conn, guest, liked.id, 4);

        // One rating above the threshold, but the average (3.5) is below it.
        let mixed = add_property(&conn, &new_property(owner, "Mixed", 12_000))
            .expect("insert failed");
        add_review(&conn, guest, mixed.id, 5);
        add_review(&conn, guest, mixed.id, 2);

        add_property(&conn, &new_property(owner, "Unreviewed", 14_000)).expect("insert failed");

        let filters = PropertyFilters {
            minimum_rating: Some(4.0),
            ..Default::default()
        };
        let listings = search_properties(&conn, &filters, 10).expect("search failed");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].property.id, liked.id);
        assert_eq!(listings[0].average_rating, Some(4.5));
    }

    #[test]
    fn search_includes_unreviewed_properties_when_no_rating_filter() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        add_property(&conn, &new_property(owner, "Unreviewed", 10_000)).expect("insert failed");

        let listings = search_properties(&conn, &PropertyFilters::default(), 10)
            .expect("search failed");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].average_rating, None);
    }

    #[test]
    fn search_with_every_filter_numbers_placeholders_correctly() {
        let conn = setup_db();
        let owner = seed_owner(&conn, "owner@example.com");
        let other = seed_owner(&conn, "other@example.com");
        let guest = seed_owner(&conn, "guest@example.com");

        let wanted = add_property(&conn, &new_property(owner, "Vancouver", 10_000))
            .expect("insert failed");
        add_review(&conn, guest, wanted.id, 5);

        // Fails each filter in turn: wrong owner, wrong city, out of price
        // range, rated too low.
        let wrong_owner = add_property(&conn, &new_property(other, "Vancouver", 10_000))
            .expect("insert failed");
        add_review(&conn, guest, wrong_owner.id, 5);
        let wrong_city = add_property(&conn, &new_property(owner, "Toronto", 10_000))
            .expect("insert failed");
        add_review(&conn, guest, wrong_city.id, 5);
        let too_expensive = add_property(&conn, &new_property(owner, "Vancouver", 20_000))
            .expect("insert failed");
        add_review(&conn, guest, too_expensive.id, 5);
        let low_rated = add_property(&conn, &new_property(owner, "Vancouver", 11_000))
            .expect("insert failed");
        add_review(&conn, guest, low_rated.id, 2);

        let filters = PropertyFilters {
            city: Some("Vancouver".to_string()),
            owner_id: Some(owner),
            minimum_price_per_night: Some(50),
            maximum_price_per_night: Some(150),
            minimum_rating: Some(4.0),
        };
        let listings = search_properties(&conn, &filters, 10).expect("search failed");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].property.id, wanted.id);
    }
}
