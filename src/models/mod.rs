pub mod categories;
pub mod hotel;
pub mod room_type;
