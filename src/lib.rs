// Classifier Trainer - mini-batch training for image classification models
// Library exports

pub mod config;
pub mod data; // Samples, loaders, batch stacking
pub mod logging;
pub mod metrics;
pub mod models; // Trainable-model contract and candle classifier
pub mod training; // Training driver and progress events

pub use config::{load_train_args, TrainArgs, TrainArgsError};
pub use data::{DataLoader, ImageDataset, InMemoryLoader, Sample};
pub use models::{ImageClassifier, TrainableModel, UniModel};
pub use training::{train, TrainingDriver, TrainingEvent};
