//! Embassy tasks
//!
//! The bridge itself runs in interrupt handlers; tasks only observe it.

pub mod status;

pub use status::status_task;
