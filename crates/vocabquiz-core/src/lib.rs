//! vocabquiz-core: Quiz session engine, scoring, and store traits.
//!
//! This crate defines the session aggregate and its state machine, the
//! scoring rules, the collaborator traits (session store, evaluator), and
//! the read projections that the server and CLI render.

pub mod engine;
pub mod error;
pub mod history;
pub mod memory;
pub mod model;
pub mod request;
pub mod scoring;
pub mod traits;
pub mod views;

pub use engine::{EngineConfig, SessionEngine};
pub use error::{ErrorKind, QuizError, StoreError};
pub use history::{HistoryConfig, HistoryQuery};
pub use memory::MemoryStore;
