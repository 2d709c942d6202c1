//! Comment submission model: the payload handed to whatever persists
//! comments, and the composer session that produces it.

use serde::{Deserialize, Serialize};

use crate::editing::commands::Cmd;
use crate::editing::document::{Document, EditError, Selection};
use crate::export::render_html;

/// Identifier of the issue a comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finished comment: rendered HTML addressed to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSubmission {
    pub issue_id: IssueId,
    pub comment: String,
}

/// External collaborator that persists or delivers submissions.
/// Dispatch is fire-and-forget; the composer consumes no result.
pub trait CommentSink {
    fn submit(&mut self, submission: CommentSubmission);
}

/// An editing session for one comment on one issue.
///
/// Owns the current document snapshot; on submit the document is rendered,
/// handed to the sink, and reset to the initial empty state.
#[derive(Debug, Clone)]
pub struct Composer {
    issue_id: IssueId,
    document: Document,
}

impl Composer {
    pub fn new(issue_id: IssueId) -> Self {
        Self {
            issue_id,
            document: Document::new(),
        }
    }

    pub fn issue_id(&self) -> &IssueId {
        &self.issue_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn apply(&mut self, cmd: Cmd) -> Result<(), EditError> {
        self.document = self.document.apply(cmd)?;
        Ok(())
    }

    pub fn select(&mut self, selection: Selection) -> Result<(), EditError> {
        self.document = self.document.with_selection(selection)?;
        Ok(())
    }

    /// Render the current document, dispatch it, and start over empty.
    pub fn submit(&mut self, sink: &mut dyn CommentSink) {
        let submission = CommentSubmission {
            issue_id: self.issue_id.clone(),
            comment: render_html(&self.document),
        };
        sink.submit(submission);
        self.document = Document::new();
    }
}
