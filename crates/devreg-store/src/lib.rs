pub mod device_repository;
pub mod error;
pub mod group_repository;
pub mod memory;
pub mod postgres;
pub mod state_history_repository;
pub mod tag_repository;

pub use device_repository::DeviceRepository;
pub use error::StoreError;
pub use group_repository::GroupRepository;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use state_history_repository::{ChangeSource, StateHistoryEntry, StateHistoryRepository};
pub use tag_repository::TagRepository;
