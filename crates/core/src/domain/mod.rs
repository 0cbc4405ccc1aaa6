pub mod forecast;
pub mod pattern;
pub mod reference;
pub mod transaction;
