//! Data access. Every function takes any SQLite executor, so callers decide
//! whether it runs against the pool or inside an open transaction.

pub mod reservation;
pub mod spot;
pub mod user;
