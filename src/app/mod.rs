pub mod context;
pub mod errors;
pub mod factory;
pub mod service;

pub use context::AppContext;
pub use errors::AppError;
pub use factory::AppFactory;
pub use service::{AppService, KeywordReport, ScoredRecord, SemanticReport};
