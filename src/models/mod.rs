pub mod reservation;
pub mod spot;
pub mod user;
