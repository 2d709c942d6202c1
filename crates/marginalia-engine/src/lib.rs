pub mod editing;
pub mod export;
pub mod models;

// Re-export key types for easier usage
pub use editing::{block::*, commands::*, controls::*, document::*, style::*};
pub use export::render_html;
pub use models::{CommentSink, CommentSubmission, Composer, IssueId};
