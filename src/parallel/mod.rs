pub mod batch;
pub mod pool;
pub mod progress;

pub use batch::row_batches;
pub use pool::WorkerPool;
pub use progress::{Progress, ProgressEvent};
