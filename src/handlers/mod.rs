pub mod auth;
pub mod bookings;
pub mod users;
pub mod vehicles;
