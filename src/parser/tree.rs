//! Tree builder: token log → rowan GreenNode.
//!
//! Builds a lossless CST from the tokens produced by the cursor, recovering
//! from malformed nesting:
//! - an end tag matching an outer element closes the elements in between
//! - an end tag matching no open element becomes an `ERROR_NODE`
//! - elements still open at end of input are closed and reported

use rowan::{GreenNode, GreenNodeBuilder, TextRange};
use smol_str::SmolStr;

use super::cursor::Token;
use super::token_log::TokenLog;
use super::errors::{Diagnostic, ErrorCode, RelatedInfo};
use super::syntax_kind::{SyntaxKind, SyntaxNode};

/// Result of parsing a complete document
#[derive(Debug, Clone)]
pub struct XmlParse {
    pub green: GreenNode,
    /// Lexical diagnostics first, then structural ones
    pub diagnostics: Vec<Diagnostic>,
    /// The token log the tree was built from
    pub tokens: TokenLog,
}

impl XmlParse {
    /// Get the root syntax node
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.severity.is_error())
    }
}

/// Parse a complete document in one go.
pub fn parse(text: &str) -> XmlParse {
    let mut cursor = super::XmlCursor::new();
    cursor.push_str(text);
    cursor.end_of_input()
}

pub(super) fn build(tokens: TokenLog, mut diagnostics: Vec<Diagnostic>) -> XmlParse {
    let mut builder = TreeBuilder {
        tokens: &tokens,
        pos: 0,
        builder: GreenNodeBuilder::new(),
        open: Vec::new(),
        root_seen: false,
        diagnostics: Vec::new(),
    };
    builder.document();
    let green = builder.builder.finish();
    diagnostics.append(&mut builder.diagnostics);
    XmlParse {
        green,
        diagnostics,
        tokens,
    }
}

struct OpenElement {
    name: SmolStr,
    /// Range of the start tag's name, for "opened here"
    name_range: TextRange,
}

struct TreeBuilder<'t> {
    tokens: &'t TokenLog,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    open: Vec<OpenElement>,
    root_seen: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> TreeBuilder<'t> {
    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn nth_kind(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.nth_kind(0) == Some(kind)
    }

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text.as_str());
            self.pos += 1;
        }
    }

    fn bump_while(&mut self, kinds: &[SyntaxKind]) {
        while self.nth_kind(0).is_some_and(|k| kinds.contains(&k)) {
            self.bump();
        }
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    fn document(&mut self) {
        self.builder.start_node(SyntaxKind::DOCUMENT.into());

        while let Some(token) = self.current() {
            match token.kind {
                SyntaxKind::LT => self.start_tag(),
                SyntaxKind::LT_SLASH => self.end_tag(),
                SyntaxKind::TEXT | SyntaxKind::CDATA if self.open.is_empty() => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorCode::E0205,
                        "text is not allowed outside the root element",
                        token.range(),
                    ));
                    self.bump();
                }
                _ => self.bump(),
            }
        }

        let end = self
            .tokens
            .last()
            .map(|t| t.range().end())
            .unwrap_or_default();
        while let Some(element) = self.open.pop() {
            self.diagnostics.push(
                Diagnostic::at_offset(
                    ErrorCode::E0202,
                    format!("element '{}' is not closed", element.name),
                    end,
                )
                .with_related(RelatedInfo::new("opened here", element.name_range)),
            );
            self.builder.finish_node();
        }

        if !self.root_seen {
            self.diagnostics.push(Diagnostic::at_offset(
                ErrorCode::E0206,
                "document has no root element",
                end,
            ));
        }

        self.builder.finish_node();
    }

    /// `<` NAME (attribute | whitespace | error)* (`>` | `/>`)?
    fn start_tag(&mut self) {
        let lt_range = self.current().map(|t| t.range()).unwrap_or_default();
        if self.open.is_empty() {
            if self.root_seen {
                self.diagnostics.push(Diagnostic::error(
                    ErrorCode::E0204,
                    "document has more than one root element",
                    lt_range,
                ));
            }
            self.root_seen = true;
        }

        self.builder.start_node(SyntaxKind::ELEMENT.into());
        self.builder.start_node(SyntaxKind::START_TAG.into());
        self.bump(); // <

        let (name, name_range) = match self.current() {
            Some(token) if token.kind == SyntaxKind::NAME => {
                let name = (token.text.clone(), token.range());
                self.bump();
                name
            }
            _ => (SmolStr::default(), lt_range),
        };

        loop {
            match self.nth_kind(0) {
                Some(SyntaxKind::NAME) => self.attribute(),
                Some(SyntaxKind::WHITESPACE | SyntaxKind::ERROR | SyntaxKind::ATTRIBUTE_VALUE) => {
                    self.bump()
                }
                Some(SyntaxKind::EQ) => self.bump(),
                Some(SyntaxKind::GT) => {
                    self.bump();
                    self.builder.finish_node(); // START_TAG
                    self.open.push(OpenElement { name, name_range });
                    return;
                }
                Some(SyntaxKind::SLASH_GT) => {
                    self.bump();
                    self.builder.finish_node(); // START_TAG
                    self.builder.finish_node(); // ELEMENT
                    return;
                }
                // Unterminated tag: the cursor already reported it, keep the
                // element open so its content still nests.
                _ => {
                    self.builder.finish_node(); // START_TAG
                    self.open.push(OpenElement { name, name_range });
                    return;
                }
            }
        }
    }

    /// NAME (ws* `=` ws* ATTRIBUTE_VALUE?)?
    fn attribute(&mut self) {
        self.builder.start_node(SyntaxKind::ATTRIBUTE.into());
        self.bump(); // NAME

        let mut lookahead = 0;
        while self.nth_kind(lookahead) == Some(SyntaxKind::WHITESPACE) {
            lookahead += 1;
        }
        if self.nth_kind(lookahead) == Some(SyntaxKind::EQ) {
            self.bump_while(&[SyntaxKind::WHITESPACE]);
            self.bump(); // =
            let mut lookahead = 0;
            while self.nth_kind(lookahead) == Some(SyntaxKind::WHITESPACE) {
                lookahead += 1;
            }
            if self.nth_kind(lookahead) == Some(SyntaxKind::ATTRIBUTE_VALUE) {
                self.bump_while(&[SyntaxKind::WHITESPACE]);
                self.bump();
            }
        }

        self.builder.finish_node();
    }

    /// `</` NAME? (whitespace | error)* `>`?
    fn end_tag(&mut self) {
        let name = match self.nth_kind(1) {
            Some(SyntaxKind::NAME) => self
                .tokens
                .get(self.pos + 1)
                .map(|t| t.text.clone())
                .unwrap_or_default(),
            _ => SmolStr::default(),
        };
        let range = self.current().map(|t| t.range()).unwrap_or_default();
        let matching = self.open.iter().rposition(|open| open.name == name);

        match matching {
            Some(index) => {
                while self.open.len() > index + 1 {
                    if let Some(element) = self.open.pop() {
                        self.diagnostics.push(
                            Diagnostic::error(
                                ErrorCode::E0202,
                                format!("element '{}' is not closed", element.name),
                                range,
                            )
                            .with_related(RelatedInfo::new("opened here", element.name_range)),
                        );
                    }
                    self.builder.finish_node();
                }
                self.end_tag_node(SyntaxKind::END_TAG);
                self.open.pop();
                self.builder.finish_node(); // ELEMENT
            }
            None => {
                self.diagnostics.push(Diagnostic::error(
                    ErrorCode::E0203,
                    format!("end tag '{name}' does not match any open element"),
                    range,
                ));
                self.builder.start_node(SyntaxKind::ERROR_NODE.into());
                self.end_tag_node(SyntaxKind::END_TAG);
                self.builder.finish_node();
            }
        }
    }

    fn end_tag_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
        self.bump(); // </
        if self.at(SyntaxKind::NAME) {
            self.bump();
        }
        self.bump_while(&[SyntaxKind::WHITESPACE, SyntaxKind::ERROR]);
        if self.at(SyntaxKind::GT) {
            self.bump();
        }
        self.builder.finish_node();
    }
}
