//! Memo synthesis and verification output for equity-memo
//!
//! The last stage of the pipeline: a macro/industry commentary pass, the
//! final memo prompt that stitches every analysis together, and the
//! plain-console verification tables that let a reader tally the model's
//! inputs against public sources before trusting the memo.

pub mod commentary;
pub mod error;
pub mod memo;
pub mod verify;

// Re-export main types
pub use commentary::ContextAnalyst;
pub use error::{ReportError, Result};
pub use memo::{MemoContext, MemoGenerator};
