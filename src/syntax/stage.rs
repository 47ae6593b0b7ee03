//! The syntactic parse operation and cursor reuse.

use std::sync::Arc;

use rowan::TextSize;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::options::SyntaxOptions;
use super::output::SyntaxOutput;
use crate::base::{DocumentSnapshot, first_differing_offset};
use crate::parser::{Checkpoint, XmlCursor};
use crate::worker::{OperationError, ParseOperation, ParseResult, check_cancelled};

/// A published Stage A result, shared with Stage B and consumers
pub type SyntaxResult = Arc<ParseResult<DocumentSnapshot, SyntaxOutput>>;

/// Stage A: snapshot → syntax tree
#[derive(Debug, Clone, Default)]
pub struct SyntacticStage {
    options: SyntaxOptions,
}

/// A restored cursor and the checkpoints still valid for the new text
struct ResumePoint {
    cursor: XmlCursor,
    checkpoints: Vec<Checkpoint>,
}

impl SyntacticStage {
    pub fn new(options: SyntaxOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SyntaxOptions {
        &self.options
    }

    /// Parse `snapshot`, resuming from `previous` where its prefix still
    /// matches.
    pub fn parse(
        &self,
        snapshot: &DocumentSnapshot,
        previous: Option<&SyntaxOutput>,
        cancel: &CancellationToken,
    ) -> Result<SyntaxOutput, OperationError> {
        let text = snapshot.text();
        let resume = previous
            .filter(|_| self.options.incremental_reuse)
            .and_then(|previous| {
                let limit = first_differing_offset(previous.text(), text);
                resume_point(previous, text, limit)
            });
        let ResumePoint {
            mut cursor,
            mut checkpoints,
        } = resume.unwrap_or_else(|| ResumePoint {
            cursor: XmlCursor::new(),
            checkpoints: Vec::new(),
        });

        let start = usize::from(cursor.offset());
        let remaining = text.get(start..).ok_or_else(|| {
            OperationError::Failed(format!("resume offset {start} is not a char boundary"))
        })?;

        let interval = self.options.checkpoint_interval.max(1);
        let poll = self.options.cancellation_poll_interval.max(1);
        let mut next_checkpoint = start + interval;
        for (index, ch) in remaining.chars().enumerate() {
            if index % poll == 0 {
                check_cancelled(cancel)?;
            }
            cursor.push(ch);
            let offset = usize::from(cursor.offset());
            if offset >= next_checkpoint {
                checkpoints.push(cursor.checkpoint());
                next_checkpoint = offset + interval;
            }
        }
        check_cancelled(cancel)?;

        let parse = cursor.end_of_input();
        trace!(
            version = %snapshot.version(),
            resumed_at = start,
            tokens = parse.tokens.len(),
            checkpoints = checkpoints.len(),
            "syntax parse finished"
        );
        Ok(SyntaxOutput::new(
            parse,
            checkpoints,
            snapshot.shared_text(),
            TextSize::try_from(start).unwrap_or_default(),
        ))
    }

    /// A cursor positioned at `offset` of `text`, restored from the newest
    /// checkpoint in `last` that is still valid for `text`.
    ///
    /// `offset` is clamped to the text and moved back to a char boundary.
    pub fn cursor_at(last: Option<&SyntaxOutput>, offset: TextSize, text: &str) -> XmlCursor {
        let mut offset = usize::from(offset).min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let mut cursor = last
            .and_then(|last| {
                let diff = first_differing_offset(last.text(), text);
                let limit = diff.min(TextSize::try_from(offset).unwrap_or(diff));
                resume_point(last, text, limit)
            })
            .map(|resume| resume.cursor)
            .unwrap_or_default();

        let start = usize::from(cursor.offset());
        if let Some(rest) = text.get(start..offset) {
            cursor.push_str(rest);
        }
        cursor
    }
}

/// Restore the last checkpoint of `previous` at or before `limit`, after
/// checking that `text` agrees with `previous` up to that checkpoint.
fn resume_point(previous: &SyntaxOutput, text: &str, limit: TextSize) -> Option<ResumePoint> {
    let checkpoints = previous.checkpoints();
    let count = checkpoints.partition_point(|c| c.offset() <= limit);
    let checkpoint = checkpoints.get(count.checked_sub(1)?)?;

    let offset = usize::from(checkpoint.offset());
    if text.get(..offset)? != previous.text().get(..offset)? {
        return None;
    }

    let cursor = XmlCursor::restore(checkpoint, previous.tokens(), previous.diagnostics())?;
    Some(ResumePoint {
        cursor,
        checkpoints: checkpoints[..count].to_vec(),
    })
}

impl ParseOperation<DocumentSnapshot, SyntaxOutput> for SyntacticStage {
    fn run(
        &self,
        input: &DocumentSnapshot,
        previous: Option<&ParseResult<DocumentSnapshot, SyntaxOutput>>,
        cancel: &CancellationToken,
    ) -> Result<SyntaxOutput, OperationError> {
        self.parse(input, previous.map(|p| &p.output), cancel)
    }

    fn fallback(&self, input: &DocumentSnapshot) -> SyntaxOutput {
        SyntaxOutput::empty(input.shared_text())
    }
}
