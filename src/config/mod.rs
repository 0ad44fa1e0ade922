// Configuration module
// Public interface for training argument loading

mod loader;
mod settings;

pub use loader::{load_train_args, parse_json, parse_toml};
pub use settings::{TrainArgs, TrainArgsError};
