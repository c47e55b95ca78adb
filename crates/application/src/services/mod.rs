//! Application Services
//!
//! Координируют retrieval и generation шаги для API и CLI.

mod analysis_service;

pub use analysis_service::AnalysisService;
