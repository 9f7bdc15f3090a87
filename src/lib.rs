pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod navigation;
pub mod service;
pub mod state;
pub mod storage;
pub mod ui;
pub mod validation;

pub use app::router;
pub use config::Config;
pub use service::ActivityService;
pub use state::AppState;
pub use storage::{ActivityStore, JsonFileStore, MemoryStore, PersistenceError};
pub use validation::{ActivityLimits, ValidationError, validate};
