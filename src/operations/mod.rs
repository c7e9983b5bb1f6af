pub mod faces;
pub mod query;
