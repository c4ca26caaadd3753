pub mod memory;
pub mod dataset;

pub use memory::MemoryStore;
pub use dataset::{builtin, DatasetGenerator, DEFAULT_SEED};
