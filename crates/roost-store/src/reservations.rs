//! Per-guest reservation listing.
//!
//! Reservations are read-only from this layer: booking and cancellation
//! belong to the surrounding application.

use roost_types::GuestStay;
use rusqlite::{params, Connection};

use crate::properties::{property_from_row, PROPERTY_COLUMNS};
use crate::StoreError;

/// Lists a guest's reservations joined to the reserved property, earliest
/// stay first, at most `limit` rows.
///
/// The limit is bound as a real statement parameter, so callers get
/// exactly `min(limit, total)` rows.
pub fn reservations_for_guest(
    conn: &Connection,
    guest_id: i64,
    limit: i64,
) -> Result<Vec<GuestStay>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT reservations.id, reservations.start_date, reservations.end_date, \
                reservations.guest_id, {PROPERTY_COLUMNS} \
         FROM reservations \
         JOIN properties ON properties.id = reservations.property_id \
         WHERE reservations.guest_id = ?1 \
         ORDER BY reservations.start_date ASC \
         LIMIT ?2"
    ))?;

    let rows = stmt.query_map(params![guest_id, limit], |row| {
        Ok(GuestStay {
            reservation_id: row.get(0)?,
            start_date: row.get(1)?,
            end_date: row.get(2)?,
            guest_id: row.get(3)?,
            property: property_from_row(row, 4)?,
        })
    })?;

    let mut stays = Vec::new();
    for row in rows {
        stays.push(row?);
    }
    Ok(stays)
}
