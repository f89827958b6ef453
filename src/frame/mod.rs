//! 影格資料模型與中繼資料擷取

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;
mod types;

pub use extractor::FrameExtractor;
pub use types::{DirectoryGroup, Frame, FrameKind, SensorSettings};
