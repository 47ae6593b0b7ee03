//! Output of one syntactic parse.

use std::sync::Arc;

use rowan::{GreenNode, GreenNodeBuilder, TextSize};

use crate::base::LineIndex;
use crate::parser::{
    AstNode, Checkpoint, Diagnostic, SyntaxKind, SyntaxNode, TokenLog, XmlDocument, XmlParse,
};

/// Syntax tree, diagnostics and resume data for one snapshot
#[derive(Debug, Clone)]
pub struct SyntaxOutput {
    green: GreenNode,
    diagnostics: Vec<Diagnostic>,
    tokens: TokenLog,
    /// Sorted by offset
    checkpoints: Vec<Checkpoint>,
    text: Arc<str>,
    reused_offset: TextSize,
    fallback: bool,
}

impl SyntaxOutput {
    pub(super) fn new(
        parse: XmlParse,
        checkpoints: Vec<Checkpoint>,
        text: Arc<str>,
        reused_offset: TextSize,
    ) -> Self {
        Self {
            green: parse.green,
            diagnostics: parse.diagnostics,
            tokens: parse.tokens,
            checkpoints,
            text,
            reused_offset,
            fallback: false,
        }
    }

    /// An empty document with no resume data, published when parsing fails.
    pub fn empty(text: Arc<str>) -> Self {
        let mut builder = GreenNodeBuilder::new();
        builder.start_node(SyntaxKind::DOCUMENT.into());
        builder.finish_node();
        Self {
            green: builder.finish(),
            diagnostics: Vec::new(),
            tokens: TokenLog::new(),
            checkpoints: Vec::new(),
            text,
            reused_offset: TextSize::default(),
            fallback: true,
        }
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Typed view of the tree
    pub fn document(&self) -> Option<XmlDocument> {
        XmlDocument::cast(self.syntax())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn tokens(&self) -> &TokenLog {
        &self.tokens
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// The text this output was parsed from
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Offset the parse resumed from; zero for a parse from scratch
    pub fn reused_offset(&self) -> TextSize {
        self.reused_offset
    }

    /// True for the empty output published after a failed parse
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }
}
