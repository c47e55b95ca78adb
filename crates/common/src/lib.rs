pub mod config;
pub mod structured_logging;

pub use config::{AppConfig, CorpusSettings, GenerationSettings, LogSettings, RetrievalSettings};

pub use structured_logging::{
    init_structured_logging,
    LoggingConfig,
    StructuredLogEntry,
    ExecutionContext,
    PerformanceMetrics,
    OperationTimer,
};
