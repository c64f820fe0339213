//! Series source adapters.

pub mod event_store;
pub mod file;
pub mod synthetic;

pub use event_store::EventStoreSource;
pub use file::FileSource;
pub use synthetic::SyntheticSource;
