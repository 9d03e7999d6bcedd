//! Pure business-rule checks over room-type data. No I/O happens here: every
//! function takes already-loaded rows or request line items and either passes
//! or names exactly which field is wrong. Handlers run these before opening a
//! transaction, so a failed rule never leaves partial state behind.

use crate::errors::ApiError;
use crate::models::categories::{Accommodation, Tier};
use crate::models::room_type::{RoomType, RoomTypeItem};

/// Within one request, no two line items may share an accommodation,
/// whatever their tier. The first duplicate wins and the error names the
/// earlier position and the tier it was assigned there.
pub fn unique_accommodations(items: &[RoomTypeItem]) -> Result<(), ApiError> {
    let mut seen: Vec<(Accommodation, Tier)> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if let Some(pos) = seen.iter().position(|(acc, _)| *acc == item.accommodation) {
            let (_, earlier_tier) = seen[pos];
            return Err(ApiError::field(
                format!("room_types.{}.accommodation", index),
                format!(
                    "accommodation '{}' is repeated in this request; it is already assigned to type '{}' at position {}. Each accommodation must be unique per hotel",
                    item.accommodation,
                    earlier_tier,
                    pos + 1
                ),
            ));
        }
        seen.push((item.accommodation, item.tier));
    }
    Ok(())
}

/// The quantities distributed across room types must add up exactly to the
/// hotel's declared total.
pub fn total_matches_declared(items: &[RoomTypeItem], declared: i64) -> Result<(), ApiError> {
    let sum = checked_total("numero_habitaciones", items.iter().map(|item| item.quantity))?;
    if sum != declared {
        return Err(ApiError::field(
            "numero_habitaciones",
            format!(
                "quantities do not reconcile: room types add up to {} but the hotel declares {} rooms in total; the figures must match exactly",
                sum, declared
            ),
        ));
    }
    Ok(())
}

/// The accommodation must belong to the tier's allowed set.
pub fn tier_allows(field: &str, tier: Tier, accommodation: Accommodation) -> Result<(), ApiError> {
    if !tier.allows(accommodation) {
        let allowed = tier
            .allowed_accommodations()
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ApiError::field(
            field,
            format!(
                "accommodation '{}' is not compatible with type '{}'; allowed accommodations are {{{}}}",
                accommodation, tier, allowed
            ),
        ));
    }
    Ok(())
}

/// For a single room-type write, the target accommodation must not already
/// be taken by another room type of the same hotel. `exclude` is the
/// record's own id on update. `hotel_nombre` only feeds the error message.
pub fn accommodation_free(
    existing: &[RoomType],
    accommodation: Accommodation,
    exclude: Option<i64>,
    hotel_nombre: &str,
) -> Result<(), ApiError> {
    let taken = existing.iter().find(|rt| {
        exclude != Some(rt.id)
            && rt
                .accommodation
                .parse::<Accommodation>()
                .map(|acc| acc == accommodation)
                .unwrap_or(false)
    });
    if let Some(rt) = taken {
        return Err(ApiError::field(
            "accommodation",
            format!(
                "accommodation '{}' is already used by a room type of kind '{}' at hotel '{}'",
                accommodation,
                crate::models::categories::normalize_tier(&rt.tier),
                hotel_nombre
            ),
        ));
    }
    Ok(())
}

/// Quantity is fixed at creation. Any update whose payload quantity differs
/// from the stored value is rejected before anything else is checked.
pub fn quantity_unchanged(stored: i64, payload: i64) -> Result<(), ApiError> {
    if stored != payload {
        return Err(ApiError::field(
            "quantity",
            format!(
                "quantity is immutable once a room type exists: stored value is {}, request says {}. Only type and accommodation can be edited",
                stored, payload
            ),
        ));
    }
    Ok(())
}

/// Single-create capacity rule: existing quantities plus the new one must not
/// exceed the hotel's declared total.
pub fn within_capacity(existing: &[RoomType], quantity: i64, capacity: i64) -> Result<(), ApiError> {
    let used = checked_total("quantity", existing.iter().map(|rt| rt.quantity))?;
    let requested = checked_total("quantity", [used, quantity].into_iter())?;
    if requested > capacity {
        return Err(ApiError::field(
            "quantity",
            format!(
                "hotel capacity exceeded: {} rooms already distributed, {} requested, {} declared in total",
                used, quantity, capacity
            ),
        ));
    }
    Ok(())
}

/// Sums quantities without silently wrapping; a total past i64::MAX is a
/// rejected request, not a panic.
fn checked_total(field: &str, quantities: impl Iterator<Item = i64>) -> Result<i64, ApiError> {
    let mut total: i64 = 0;
    for quantity in quantities {
        total = total.checked_add(quantity).ok_or_else(|| {
            ApiError::field(
                field,
                "room type quantities overflow the representable total".to_string(),
            )
        })?;
    }
    Ok(total)
}
