pub mod date_time;
pub mod uuid;
