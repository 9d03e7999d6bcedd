//! Administrative removal of duplicates predating the unique constraints:
//! room types sharing (hotel_id, accommodation) and hotels sharing a nombre.
//! For each duplicate group the lowest id survives. Both passes are dry-run
//! unless `apply` is set, and safe to run repeatedly.

use sqlx::{Row, SqlitePool};

/// Reports room types duplicated on (hotel_id, accommodation) and, when
/// `apply` is set, deletes all but the oldest row of each group. Returns the
/// number of rows removed (or that would be removed on a dry run).
pub async fn clean_duplicate_accommodations(pool: &SqlitePool, apply: bool) -> sqlx::Result<u64> {
    let groups = sqlx::query(
        "SELECT hotel_id, accommodation, COUNT(*) AS n FROM room_types \
         GROUP BY hotel_id, accommodation HAVING COUNT(*) > 1",
    )
    .fetch_all(pool)
    .await?;

    if groups.is_empty() {
        log::info!("no duplicate accommodations found");
        return Ok(0);
    }

    let mut removed = 0u64;
    for group in &groups {
        let hotel_id: i64 = group.get("hotel_id");
        let accommodation: String = group.get("accommodation");
        let n: i64 = group.get("n");
        log::info!(
            "hotel {}: accommodation '{}' appears {} times",
            hotel_id,
            accommodation,
            n
        );
        removed += (n - 1) as u64;

        if apply {
            sqlx::query(
                "DELETE FROM room_types WHERE hotel_id = ? AND accommodation = ? \
                 AND id <> (SELECT MIN(id) FROM room_types WHERE hotel_id = ? AND accommodation = ?)",
            )
            .bind(hotel_id)
            .bind(&accommodation)
            .bind(hotel_id)
            .bind(&accommodation)
            .execute(pool)
            .await?;
        }
    }
    Ok(removed)
}

/// Same shape for hotels duplicated on nombre. The room types of a dropped
/// hotel go with it via the FK cascade.
pub async fn clean_duplicate_hotels(pool: &SqlitePool, apply: bool) -> sqlx::Result<u64> {
    let groups = sqlx::query(
        "SELECT nombre, COUNT(*) AS n FROM hotels GROUP BY nombre HAVING COUNT(*) > 1",
    )
    .fetch_all(pool)
    .await?;

    if groups.is_empty() {
        log::info!("no duplicate hotels found");
        return Ok(0);
    }

    let mut removed = 0u64;
    for group in &groups {
        let nombre: String = group.get("nombre");
        let n: i64 = group.get("n");
        log::info!("hotel nombre '{}' appears {} times", nombre, n);
        removed += (n - 1) as u64;

        if apply {
            sqlx::query(
                "DELETE FROM hotels WHERE nombre = ? \
                 AND id <> (SELECT MIN(id) FROM hotels WHERE nombre = ?)",
            )
            .bind(&nombre)
            .bind(&nombre)
            .execute(pool)
            .await?;
        }
    }
    Ok(removed)
}
