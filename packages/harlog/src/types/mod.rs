//! Data model: the HAR subset the pipeline consumes and the
//! extraction output it produces.

pub mod extract;
pub mod har;

pub use extract::{CandidateSelection, CandidateSummary, ExtractionResult, RequestDetails, SelectionReply};
pub use har::{HarDocument, HarEntry, HarLog, HarRequest, HarResponse, Header, PostData, PostParam, ResponseContent};
