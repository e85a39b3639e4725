pub mod file;
pub mod gateway;
pub mod memory;
pub mod sample;
pub mod store;

pub use file::FileStore;
pub use gateway::{GatewayLimits, LedgerGateway};
pub use memory::MemoryStore;
pub use sample::sample_documents;
pub use store::{RecordStore, WorldState};

#[cfg(any(test, feature = "testing"))]
pub use store::MockRecordStore;
