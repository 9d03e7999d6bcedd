use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::categories::{normalize_tier, Accommodation, Tier};
use crate::models::hotel::Hotel;

/// Raw `room_types` row. `type` is stored as text because rows predating the
/// normalization pass carry assorted encoding variants of ESTÁNDAR; reads go
/// through [`RoomType::into_payload`] before leaving the API.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomType {
    pub id: i64,
    pub hotel_id: i64,
    #[sqlx(rename = "type")]
    pub tier: String,
    pub accommodation: String,
    pub quantity: i64,
}

/// JSON shape of a room type, tier already canonicalized.
#[derive(Debug, Serialize)]
pub struct RoomTypePayload {
    pub id: i64,
    pub hotel_id: i64,
    #[serde(rename = "type")]
    pub tier: String,
    pub accommodation: String,
    pub quantity: i64,
}

/// Room type with its owning hotel attached, as returned by /room-types.
#[derive(Debug, Serialize)]
pub struct RoomTypeWithHotel {
    #[serde(flatten)]
    pub room_type: RoomTypePayload,
    pub hotel: Hotel,
}

impl RoomType {
    pub fn into_payload(self) -> RoomTypePayload {
        RoomTypePayload {
            id: self.id,
            hotel_id: self.hotel_id,
            tier: normalize_tier(&self.tier),
            accommodation: self.accommodation,
            quantity: self.quantity,
        }
    }

    pub fn with_hotel(self, hotel: Hotel) -> RoomTypeWithHotel {
        RoomTypeWithHotel {
            room_type: self.into_payload(),
            hotel,
        }
    }
}

/// One room-type line item inside a hotel create/update request.
#[derive(Debug, Deserialize, Validate)]
pub struct RoomTypeItem {
    #[serde(rename = "type")]
    pub tier: Tier,
    pub accommodation: Accommodation,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: i64,
}

/// Body of POST /room-types.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomType {
    pub hotel_id: i64,
    #[serde(rename = "type")]
    pub tier: Tier,
    pub accommodation: Accommodation,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: i64,
}

/// Body of PUT /room-types/{id}. `quantity` must still be submitted so the
/// immutability rule can compare it against the stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateRoomType {
    #[serde(rename = "type")]
    pub tier: Tier,
    pub accommodation: Accommodation,
    pub quantity: i64,
}
