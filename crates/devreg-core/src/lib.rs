pub mod error;
pub mod logger;
pub mod registry;

pub use error::RegistryError;
pub use logger::{LogEvent, Logger, NoopLogger, RecordingLogger, TracingLogger};
pub use registry::Registry;
