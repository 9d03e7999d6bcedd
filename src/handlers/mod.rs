pub mod hotels;
pub mod room_types;
