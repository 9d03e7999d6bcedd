use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::handlers::hotels::{load_hotel, load_room_types};
use crate::models::hotel::Hotel;
use crate::models::room_type::{CreateRoomType, RoomType, UpdateRoomType};
use crate::validation;

const WRITES_DISABLED: &str =
    "room type creation and deletion are disabled by policy; manage room types through the hotel endpoints";

pub async fn get_room_types(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let rows = sqlx::query_as::<_, RoomType>(
        "SELECT rt.* FROM room_types rt \
         JOIN hotels h ON h.id = rt.hotel_id \
         ORDER BY h.nombre ASC, rt.id ASC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let hotels: HashMap<i64, Hotel> = sqlx::query_as::<_, Hotel>("SELECT * FROM hotels")
        .fetch_all(pool.get_ref())
        .await?
        .into_iter()
        .map(|h| (h.id, h))
        .collect();

    let payload: Vec<_> = rows
        .into_iter()
        .filter_map(|rt| hotels.get(&rt.hotel_id).cloned().map(|h| rt.with_hotel(h)))
        .collect();

    Ok(HttpResponse::Ok().json(payload))
}

pub async fn get_room_type_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let room_type = load_room_type(pool.get_ref(), id).await?;
    let hotel = load_hotel(pool.get_ref(), room_type.hotel_id).await?;
    Ok(HttpResponse::Ok().json(room_type.with_hotel(hotel)))
}

pub async fn create_room_type(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    body: web::Json<CreateRoomType>,
) -> Result<HttpResponse, ApiError> {
    if !config.room_type_writes_enabled {
        return Err(ApiError::Forbidden(WRITES_DISABLED.to_string()));
    }

    body.validate().map_err(ApiError::from_validator)?;

    let hotel = load_hotel(pool.get_ref(), body.hotel_id).await?;

    if config.strict() {
        validation::tier_allows("accommodation", body.tier, body.accommodation)?;
    }

    let siblings = load_room_types(pool.get_ref(), hotel.id).await?;
    validation::accommodation_free(&siblings, body.accommodation, None, &hotel.nombre)?;
    validation::within_capacity(&siblings, body.quantity, hotel.numero_habitaciones)?;

    let created = sqlx::query_as::<_, RoomType>(
        "INSERT INTO room_types (hotel_id, type, accommodation, quantity) \
         VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(body.hotel_id)
    .bind(body.tier.to_string())
    .bind(body.accommodation.to_string())
    .bind(body.quantity)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(created.with_hotel(hotel)))
}

pub async fn update_room_type(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    path: web::Path<i64>,
    body: web::Json<UpdateRoomType>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = load_room_type(pool.get_ref(), id).await?;

    // La cantidad es inmutable: se comprueba antes que cualquier otra regla
    validation::quantity_unchanged(existing.quantity, body.quantity)?;

    if config.strict() {
        validation::tier_allows("accommodation", body.tier, body.accommodation)?;
    }

    let hotel = load_hotel(pool.get_ref(), existing.hotel_id).await?;
    let siblings = load_room_types(pool.get_ref(), hotel.id).await?;
    validation::accommodation_free(&siblings, body.accommodation, Some(id), &hotel.nombre)?;

    // Only the mutable fields are written; quantity stays as stored.
    let updated = sqlx::query_as::<_, RoomType>(
        "UPDATE room_types SET type = ?, accommodation = ? WHERE id = ? RETURNING *",
    )
    .bind(body.tier.to_string())
    .bind(body.accommodation.to_string())
    .bind(id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(updated.with_hotel(hotel)))
}

pub async fn delete_room_type(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    if !config.room_type_writes_enabled {
        return Err(ApiError::Forbidden(WRITES_DISABLED.to_string()));
    }

    let id = path.into_inner();
    let result = sqlx::query("DELETE FROM room_types WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("room type"));
    }

    Ok(HttpResponse::NoContent().finish())
}

async fn load_room_type(pool: &SqlitePool, id: i64) -> Result<RoomType, ApiError> {
    sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("room type"))
}
