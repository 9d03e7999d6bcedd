use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::room_type::{RoomTypeItem, RoomTypePayload};

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Hotel {
    pub id: i64,
    pub nombre: String,
    pub direccion: String,
    pub ciudad: String,
    pub nit: String,
    pub numero_habitaciones: i64,
}

/// Hotel with its room types attached, as returned by every hotel endpoint.
#[derive(Debug, Serialize)]
pub struct HotelWithRoomTypes {
    #[serde(flatten)]
    pub hotel: Hotel,
    pub room_types: Vec<RoomTypePayload>,
}

/// Body of POST /hotels and PUT /hotels/{id}. The room-type list is optional;
/// when present on an update it replaces the hotel's whole existing set.
#[derive(Debug, Deserialize, Validate)]
pub struct HotelInput {
    #[validate(length(min = 1, message = "nombre is required"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "direccion is required"))]
    pub direccion: String,
    #[validate(length(min = 1, message = "ciudad is required"))]
    pub ciudad: String,
    #[validate(length(min = 1, message = "nit is required"))]
    pub nit: String,
    #[validate(range(min = 1, message = "numero_habitaciones must be a positive integer"))]
    pub numero_habitaciones: i64,
    #[validate]
    pub room_types: Option<Vec<RoomTypeItem>>,
}
