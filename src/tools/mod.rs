mod empty_dir_cleaner;
mod env_expander;
mod file_hasher;
mod fits_header;
mod path_validator;
mod xisf_header;

pub use empty_dir_cleaner::remove_empty_directories;
pub use env_expander::{expand_env_vars, expand_env_vars_with};
pub use file_hasher::{calculate_file_hash, files_identical};
pub use fits_header::{HeaderMap, parse_fits_header, read_fits_header};
pub use path_validator::{ensure_directory_exists, prepare_dest_dir, validate_source_dir};
pub use xisf_header::{parse_xisf_header, read_xisf_header};
