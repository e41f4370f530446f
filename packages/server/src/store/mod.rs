mod country;

pub use country::{CountryChanges, CountryStore};
