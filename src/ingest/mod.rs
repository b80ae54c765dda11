//! Upload intake: validation and registration of PDF payloads.

pub mod upload;

pub use upload::{validate_upload, UploadError, UploadReceipt, Uploader};
