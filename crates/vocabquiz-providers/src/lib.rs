//! vocabquiz-providers: collaborator adapters.
//!
//! A JSON-file `SessionStore`, the HTTP and mock `Evaluator`s, and the TOML
//! configuration that selects and builds them.

pub mod config;
pub mod error;
pub mod file_store;
pub mod http;
pub mod mock;

pub use config::{
    create_evaluator, create_store, load_config, load_config_from, EvaluatorConfig, StoreConfig,
    VocabQuizConfig,
};
pub use error::EvaluatorError;
pub use file_store::JsonFileStore;
pub use http::HttpEvaluator;
pub use mock::MockEvaluator;
