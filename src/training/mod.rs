// Training module - mini-batch training driver and progress reporting

pub mod driver;
pub mod progress;

pub use driver::{batches_per_epoch, log_interval, train, TrainingDriver};
pub use progress::{ChannelSink, ProgressSink, TracingSink, TrainingEvent};
