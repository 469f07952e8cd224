pub mod commands;
pub mod document;
pub mod storage;

pub use commands::{CommandStack, Snapshot};
pub use document::{DocumentEvent, DocumentStore, EditorConfig, ImportError, SubscriptionId};
pub use storage::{JsonFileStorage, MemoryStorage, Persistence, StorageError};
