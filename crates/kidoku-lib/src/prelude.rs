pub use crate::error::Error;
pub use crate::models::{RawChapter, SeriesRecord, SourceObservation, Token};
