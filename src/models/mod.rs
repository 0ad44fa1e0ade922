// Models
// The trainable-model contract plus a candle image classifier implementing it

pub mod classifier;
pub mod common;
pub mod persistence;
pub mod uri;

pub use classifier::{ClassifierConfig, ImageClassifier};
pub use common::{TrainableModel, UniModel};
pub use persistence::{load_model_metadata, model_exists, save_model_with_metadata, ModelMetadata};
pub use uri::{model_uri, path_from_uri};
