pub mod config;
pub mod edit;
pub mod error;
pub mod model;
pub mod notify;
pub mod storage;
pub mod store;

pub use edit::EditSession;
pub use error::AppError;
pub use model::{Filter, Task, TaskStats};
pub use store::{LoadOutcome, StoreEvent, TASKS_SLOT, TaskStore};
