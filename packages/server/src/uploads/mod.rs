//! Chunked-upload tracking and reassembly.
//!
//! A capture is uploaded as ordered chunks keyed by a client-chosen
//! `fileId`. The tracker records which chunks arrived, reassembles
//! them in strict index order on finalize, and hands the assembled
//! file to the extraction pipeline by path.

pub mod session;
pub mod store;
pub mod tracker;

pub use session::UploadSession;
pub use store::{MemorySessionStore, SessionHandle, SessionStore};
pub use tracker::{spawn_session_sweeper, FinalizedUpload, UploadTracker};
