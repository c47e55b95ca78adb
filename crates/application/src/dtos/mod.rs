//! Data Transfer Objects
//!
//! Wire shapes of the `/api/search` and `/api/suggest` endpoints.

mod analysis;

pub use analysis::*;
