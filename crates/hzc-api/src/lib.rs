pub mod category;
pub mod config;
pub mod error;
pub mod flashcard;
pub mod metrics;
pub mod pinyin;
pub mod review;
pub mod router;
pub mod state;
pub mod tracing;
pub mod transfer;
pub mod translation;
pub mod validation;

pub use config::ApiConfig;
pub use state::ApiState;
