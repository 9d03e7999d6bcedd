use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::models::hotel::{Hotel, HotelInput, HotelWithRoomTypes};
use crate::models::room_type::{RoomType, RoomTypeItem};
use crate::validation;

pub async fn get_hotels(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let hotels = sqlx::query_as::<_, Hotel>("SELECT * FROM hotels ORDER BY id")
        .fetch_all(pool.get_ref())
        .await?;

    let rows = sqlx::query_as::<_, RoomType>("SELECT * FROM room_types ORDER BY hotel_id, id")
        .fetch_all(pool.get_ref())
        .await?;

    let mut by_hotel: HashMap<i64, Vec<RoomType>> = HashMap::new();
    for row in rows {
        by_hotel.entry(row.hotel_id).or_default().push(row);
    }

    let payload: Vec<HotelWithRoomTypes> = hotels
        .into_iter()
        .map(|hotel| {
            let room_types = by_hotel.remove(&hotel.id).unwrap_or_default();
            attach(hotel, room_types)
        })
        .collect();

    Ok(HttpResponse::Ok().json(payload))
}

pub async fn get_hotel_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let hotel = load_hotel(pool.get_ref(), id).await?;
    let room_types = load_room_types(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(attach(hotel, room_types)))
}

pub async fn create_hotel(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    body: web::Json<HotelInput>,
) -> Result<HttpResponse, ApiError> {
    // 1. Validar inputs básicos
    body.validate().map_err(ApiError::from_validator)?;

    // 2. Pre-check del NIT; la restricción UNIQUE del store cubre la carrera
    let nit_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM hotels WHERE nit = ?")
        .bind(&body.nit)
        .fetch_optional(pool.get_ref())
        .await?;
    if nit_taken.is_some() {
        return Err(ApiError::field(
            "nit",
            format!("nit '{}' is already registered to another hotel", body.nit),
        ));
    }

    if let Some(items) = &body.room_types {
        check_line_items(items, body.numero_habitaciones, &config)?;
    }

    // 3. Transacción: hotel + tipos de habitación como una sola unidad
    let mut tx = pool.begin().await?;

    let hotel = sqlx::query_as::<_, Hotel>(
        "INSERT INTO hotels (nombre, direccion, ciudad, nit, numero_habitaciones) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&body.nombre)
    .bind(&body.direccion)
    .bind(&body.ciudad)
    .bind(&body.nit)
    .bind(body.numero_habitaciones)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(items) = &body.room_types {
        insert_room_types(&mut tx, hotel.id, items).await?;
    }

    tx.commit().await?;

    let room_types = load_room_types(pool.get_ref(), hotel.id).await?;
    Ok(HttpResponse::Created().json(attach(hotel, room_types)))
}

pub async fn update_hotel(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    path: web::Path<i64>,
    body: web::Json<HotelInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    load_hotel(pool.get_ref(), id).await?;

    body.validate().map_err(ApiError::from_validator)?;

    // Permite conservar el NIT del propio hotel
    let nit_taken =
        sqlx::query_scalar::<_, i64>("SELECT id FROM hotels WHERE nit = ? AND id <> ?")
            .bind(&body.nit)
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await?;
    if nit_taken.is_some() {
        return Err(ApiError::field(
            "nit",
            format!("nit '{}' is already registered to another hotel", body.nit),
        ));
    }

    if let Some(items) = &body.room_types {
        check_line_items(items, body.numero_habitaciones, &config)?;
    }

    let mut tx = pool.begin().await?;

    let hotel = sqlx::query_as::<_, Hotel>(
        "UPDATE hotels SET nombre = ?, direccion = ?, ciudad = ?, nit = ?, \
         numero_habitaciones = ? WHERE id = ? RETURNING *",
    )
    .bind(&body.nombre)
    .bind(&body.direccion)
    .bind(&body.ciudad)
    .bind(&body.nit)
    .bind(body.numero_habitaciones)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    // The submitted list overwrites the hotel's whole existing room-type
    // set; there is no partial merge.
    if let Some(items) = &body.room_types {
        sqlx::query("DELETE FROM room_types WHERE hotel_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_room_types(&mut tx, id, items).await?;
    }

    tx.commit().await?;

    let room_types = load_room_types(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(attach(hotel, room_types)))
}

pub async fn delete_hotel(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    // Room types go with the hotel via the FK cascade.
    let result = sqlx::query("DELETE FROM hotels WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("hotel"));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Accommodation uniqueness and quantity reconciliation over the submitted
/// line items; per-item compatibility in strict mode (lenient keeps the
/// legacy server behavior, which left the compatibility table to the UI).
fn check_line_items(
    items: &[RoomTypeItem],
    declared_total: i64,
    config: &AppConfig,
) -> Result<(), ApiError> {
    validation::unique_accommodations(items)?;
    validation::total_matches_declared(items, declared_total)?;
    if config.strict() {
        for (index, item) in items.iter().enumerate() {
            validation::tier_allows(
                &format!("room_types.{}.accommodation", index),
                item.tier,
                item.accommodation,
            )?;
        }
    }
    Ok(())
}

async fn insert_room_types(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    hotel_id: i64,
    items: &[RoomTypeItem],
) -> Result<(), ApiError> {
    for item in items {
        sqlx::query(
            "INSERT INTO room_types (hotel_id, type, accommodation, quantity) VALUES (?, ?, ?, ?)",
        )
        .bind(hotel_id)
        .bind(item.tier.to_string())
        .bind(item.accommodation.to_string())
        .bind(item.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub(crate) async fn load_hotel(pool: &SqlitePool, id: i64) -> Result<Hotel, ApiError> {
    sqlx::query_as::<_, Hotel>("SELECT * FROM hotels WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("hotel"))
}

pub(crate) async fn load_room_types(
    pool: &SqlitePool,
    hotel_id: i64,
) -> Result<Vec<RoomType>, ApiError> {
    Ok(
        sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE hotel_id = ? ORDER BY id")
            .bind(hotel_id)
            .fetch_all(pool)
            .await?,
    )
}

fn attach(hotel: Hotel, room_types: Vec<RoomType>) -> HotelWithRoomTypes {
    HotelWithRoomTypes {
        room_types: room_types.into_iter().map(RoomType::into_payload).collect(),
        hotel,
    }
}
