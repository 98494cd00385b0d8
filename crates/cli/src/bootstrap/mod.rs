mod config;
mod logging;

pub use config::{finalize_config, load_config};
pub use logging::init_logging;
