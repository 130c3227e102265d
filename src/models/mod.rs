pub mod dashboard;
pub mod forecast;
pub mod snapshot;
