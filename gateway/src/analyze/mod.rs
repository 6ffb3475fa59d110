mod routes;
mod structs;

pub mod report;

pub use routes::*;
pub use structs::*;
