//! Pipeline stages for a single OCR request.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ request ──▶ service
//! (path)    (message +   (HTTP POST,
//!            file bytes)  JSON parse)
//! ```
//!
//! 1. [`input`]   — validate the local file, derive its OCR format and name,
//!    read its bytes in one scoped call
//! 2. [`request`] — assemble the JSON `message` metadata (request id,
//!    timestamp, language, table flag) alongside the bytes
//! 3. [`service`] — send the multipart request and parse the response; the
//!    only stage with network I/O

pub mod input;
pub mod request;
pub mod service;
