pub mod load;
pub mod types;

pub use types::{Config, DEFAULT_BLINK_DIR, DEFAULT_DATA_DIR, DEFAULT_FRAME_EXTENSIONS};
