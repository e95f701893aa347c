//! Adapters layer: batch writers and task spawners.

pub mod recording;
pub mod spawner;
pub mod storage;

pub use recording::RecordingBatchWriter;
pub use spawner::TokioSpawner;
pub use storage::StorageBatchWriter;
