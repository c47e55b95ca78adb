//! # Application Layer
//!
//! - Application Services: [`AnalysisService`] (retrieval + generation)
//! - DTOs: wire shapes of the API endpoints
//! - Handlers: transport-agnostic `/api/search` and `/api/suggest`
//!
//! ## Dependency Direction
//!
//! ```text
//! Application Layer -> Domain Layer, memory (retrieval), llm (generation)
//! CLI -> Application Layer
//! ```

pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod services;

pub use errors::{ApplicationError, ApplicationResult};
pub use handlers::{ApiHandlers, ApiResponse, SEARCH_PATH, SUGGEST_PATH};
pub use services::AnalysisService;
