pub mod jwt;
pub mod rental;
