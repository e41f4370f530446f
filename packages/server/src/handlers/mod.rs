pub mod country;
pub mod uploads;
