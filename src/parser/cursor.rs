//! Character-fed XML tokenizer with resumable state.
//!
//! The cursor consumes one `char` at a time and appends completed tokens to a
//! log. Everything the tokenizer needs to continue lives in [`CursorState`],
//! which is small (the lexical state, the token in progress and the open
//! element path), so the cursor can be captured as a [`Checkpoint`] at any
//! offset and later restored against the token log of the parse that
//! produced it.
//!
//! ```text
//! chars ─push─▶ CursorState ─flush─▶ token log ─end_of_input─▶ XmlParse
//!                   │
//!                   └─checkpoint()─▶ Checkpoint { state, log lengths }
//! ```

use rowan::{TextRange, TextSize};
use smol_str::SmolStr;

use super::errors::{Diagnostic, ErrorCode};
use super::syntax_kind::SyntaxKind;
use super::token_log::TokenLog;
use super::tree::{self, XmlParse};
use crate::base::text_utils::{is_name_char, is_name_start_char, is_xml_whitespace};

/// A completed token in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: SmolStr,
    pub offset: TextSize,
}

impl Token {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text.as_str()))
    }
}

/// Lexical state of the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Character data between markup
    Content,
    /// After `<`
    TagOpen,
    /// After `<!`, deciding between comment, CDATA and declaration
    MarkupDeclaration,
    Comment { dashes: u8 },
    CData { brackets: u8 },
    Declaration { depth: u8 },
    ProcessingInstruction { question: bool },
    /// Reading a start tag name
    TagName,
    /// Inside a start tag, between attributes
    InsideTag,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValue { quote: char },
    UnquotedAttributeValue,
    /// After `/` inside a start tag
    SelfClosing,
    /// After `</`
    EndTagOpen,
    EndTagName,
    /// Inside an end tag, after its name
    InsideEndTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingToken {
    kind: SyntaxKind,
    start: TextSize,
    text: String,
}

/// Everything needed to resume tokenizing at [`CursorState::offset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    lex: LexState,
    offset: TextSize,
    pending: Option<PendingToken>,
    open_elements: Vec<SmolStr>,
    current_attribute: Option<SmolStr>,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            lex: LexState::Content,
            offset: TextSize::new(0),
            pending: None,
            open_elements: Vec::new(),
            current_attribute: None,
        }
    }
}

/// A resume point: the cursor state at an offset plus the lengths of the
/// token and diagnostic logs at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    state: CursorState,
    tokens_len: usize,
    diagnostics_len: usize,
}

impl Checkpoint {
    pub fn offset(&self) -> TextSize {
        self.state.offset
    }
}

/// What a caret at the cursor's offset is positioned in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorContext {
    /// Character data; `element` is the innermost open element
    Content { element: Option<SmolStr> },
    /// Typing an element name (start or end tag)
    ElementName { partial: SmolStr, closing: bool },
    /// Inside a start tag but not in an attribute
    Tag { element: Option<SmolStr> },
    AttributeName { element: Option<SmolStr>, partial: SmolStr },
    AttributeValue {
        element: Option<SmolStr>,
        attribute: Option<SmolStr>,
        partial: SmolStr,
    },
    /// Comment, CDATA, declaration or processing instruction
    Markup,
}

enum Step {
    Consumed,
    Reprocess,
}

/// Character-fed, cloneable XML tokenizer
#[derive(Debug, Clone, Default)]
pub struct XmlCursor {
    state: CursorState,
    tokens: TokenLog,
    diagnostics: Vec<Diagnostic>,
}

impl XmlCursor {
    /// A cursor at offset zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a cursor from a checkpoint taken during a previous parse.
    ///
    /// `tokens` and `diagnostics` must be the logs of the parse that recorded
    /// the checkpoint; returns `None` if they are shorter than the checkpoint
    /// expects.
    pub fn restore(
        checkpoint: &Checkpoint,
        tokens: &TokenLog,
        diagnostics: &[Diagnostic],
    ) -> Option<Self> {
        Some(Self {
            state: checkpoint.state.clone(),
            tokens: tokens.prefix(checkpoint.tokens_len)?,
            diagnostics: diagnostics.get(..checkpoint.diagnostics_len)?.to_vec(),
        })
    }

    /// Capture the current position as a resume point.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            tokens_len: self.tokens.len(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    /// Byte offset of the next character to be pushed
    pub fn offset(&self) -> TextSize {
        self.state.offset
    }

    pub fn lex_state(&self) -> LexState {
        self.state.lex
    }

    /// Names of the elements open at the cursor, outermost first
    pub fn element_path(&self) -> &[SmolStr] {
        &self.state.open_elements
    }

    pub fn current_element(&self) -> Option<&SmolStr> {
        self.state.open_elements.last()
    }

    /// Completed tokens so far
    pub fn tokens(&self) -> &TokenLog {
        &self.tokens
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Feed every character of `text`.
    pub fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.push(ch);
        }
    }

    /// Feed one character.
    pub fn push(&mut self, ch: char) {
        while let Step::Reprocess = self.step(ch) {}
        self.state.offset += TextSize::of(ch);
    }

    /// Classify the caret position for completion-style consumers.
    pub fn context(&self) -> CursorContext {
        let element = self.current_element().cloned();
        let partial = || {
            self.state
                .pending
                .as_ref()
                .map(|p| SmolStr::new(&p.text))
                .unwrap_or_default()
        };
        match self.state.lex {
            LexState::Content => CursorContext::Content { element },
            LexState::TagOpen => CursorContext::ElementName {
                partial: SmolStr::default(),
                closing: false,
            },
            LexState::TagName => CursorContext::ElementName {
                partial: partial(),
                closing: false,
            },
            LexState::EndTagOpen => CursorContext::ElementName {
                partial: SmolStr::default(),
                closing: true,
            },
            LexState::EndTagName => CursorContext::ElementName {
                partial: partial(),
                closing: true,
            },
            LexState::InsideTag | LexState::SelfClosing | LexState::InsideEndTag => {
                CursorContext::Tag { element }
            }
            LexState::AttributeName => CursorContext::AttributeName {
                element,
                partial: partial(),
            },
            LexState::AfterAttributeName | LexState::BeforeAttributeValue => {
                CursorContext::Tag { element }
            }
            LexState::AttributeValue { quote } => {
                let text = partial();
                CursorContext::AttributeValue {
                    element,
                    attribute: self.state.current_attribute.clone(),
                    partial: SmolStr::new(text.trim_start_matches(quote)),
                }
            }
            LexState::UnquotedAttributeValue => CursorContext::AttributeValue {
                element,
                attribute: self.state.current_attribute.clone(),
                partial: partial(),
            },
            LexState::MarkupDeclaration
            | LexState::Comment { .. }
            | LexState::CData { .. }
            | LexState::Declaration { .. }
            | LexState::ProcessingInstruction { .. } => CursorContext::Markup,
        }
    }

    /// Flush the token in progress, report unterminated constructs and build
    /// the syntax tree.
    pub fn end_of_input(mut self) -> XmlParse {
        let offset = self.state.offset;
        match self.state.lex {
            LexState::Content => {}
            LexState::Comment { .. } => {
                self.error_at(ErrorCode::E0103, "comment is not terminated", offset)
            }
            LexState::CData { .. } => {
                self.error_at(ErrorCode::E0104, "CDATA section is not terminated", offset)
            }
            LexState::MarkupDeclaration | LexState::Declaration { .. } => {
                self.error_at(ErrorCode::E0105, "declaration is not terminated", offset)
            }
            LexState::ProcessingInstruction { .. } => self.error_at(
                ErrorCode::E0105,
                "processing instruction is not terminated",
                offset,
            ),
            LexState::TagOpen => {
                self.retag_pending(SyntaxKind::ERROR);
                self.error_at(ErrorCode::E0101, "'<' is not followed by a name", offset);
            }
            LexState::SelfClosing => {
                self.retag_pending(SyntaxKind::ERROR);
                self.error_at(ErrorCode::E0201, "tag is not terminated", offset);
            }
            LexState::AttributeValue { .. } => {
                self.error_at(ErrorCode::E0102, "attribute value is not terminated", offset)
            }
            LexState::TagName
            | LexState::InsideTag
            | LexState::AttributeName
            | LexState::AfterAttributeName
            | LexState::BeforeAttributeValue
            | LexState::UnquotedAttributeValue
            | LexState::EndTagOpen
            | LexState::EndTagName
            | LexState::InsideEndTag => {
                self.error_at(ErrorCode::E0201, "tag is not terminated", offset)
            }
        }
        self.flush();
        tree::build(self.tokens, self.diagnostics)
    }

    // =========================================================================
    // State machine
    // =========================================================================

    fn step(&mut self, ch: char) -> Step {
        let offset = self.state.offset;
        match self.state.lex {
            LexState::Content => {
                if ch == '<' {
                    self.begin(SyntaxKind::LT, ch);
                    self.state.lex = LexState::TagOpen;
                } else {
                    self.content_char(ch);
                }
            }
            LexState::TagOpen => match ch {
                '/' => {
                    self.append(ch);
                    self.retag_pending(SyntaxKind::LT_SLASH);
                    self.flush();
                    self.state.lex = LexState::EndTagOpen;
                }
                '!' => {
                    self.append(ch);
                    self.state.lex = LexState::MarkupDeclaration;
                }
                '?' => {
                    self.append(ch);
                    self.retag_pending(SyntaxKind::PROCESSING_INSTRUCTION);
                    self.state.lex = LexState::ProcessingInstruction { question: false };
                }
                c if is_name_start_char(c) => {
                    self.begin(SyntaxKind::NAME, c);
                    self.state.lex = LexState::TagName;
                }
                _ => {
                    self.retag_pending(SyntaxKind::ERROR);
                    self.flush();
                    self.error_at(ErrorCode::E0101, "'<' is not followed by a name", offset);
                    self.state.lex = LexState::Content;
                    return Step::Reprocess;
                }
            },
            LexState::MarkupDeclaration => {
                self.append(ch);
                let text = self.pending_text();
                if text == "<!--" {
                    self.retag_pending(SyntaxKind::COMMENT);
                    self.state.lex = LexState::Comment { dashes: 0 };
                } else if text == "<![CDATA[" {
                    self.retag_pending(SyntaxKind::CDATA);
                    self.state.lex = LexState::CData { brackets: 0 };
                } else if "<!--".starts_with(text) || "<![CDATA[".starts_with(text) {
                    // keep collecting the prefix
                } else {
                    self.retag_pending(SyntaxKind::DECLARATION);
                    self.state.lex = LexState::Declaration { depth: 0 };
                    if ch == '>' {
                        self.finish_markup();
                    }
                }
            }
            LexState::Comment { dashes } => {
                self.append(ch);
                self.state.lex = match ch {
                    '-' => LexState::Comment {
                        dashes: (dashes + 1).min(2),
                    },
                    '>' if dashes >= 2 => {
                        self.finish_markup();
                        LexState::Content
                    }
                    _ => LexState::Comment { dashes: 0 },
                };
            }
            LexState::CData { brackets } => {
                self.append(ch);
                self.state.lex = match ch {
                    ']' => LexState::CData {
                        brackets: (brackets + 1).min(2),
                    },
                    '>' if brackets >= 2 => {
                        self.finish_markup();
                        LexState::Content
                    }
                    _ => LexState::CData { brackets: 0 },
                };
            }
            LexState::Declaration { depth } => {
                self.append(ch);
                match ch {
                    '[' => self.state.lex = LexState::Declaration { depth: depth + 1 },
                    ']' => {
                        self.state.lex = LexState::Declaration {
                            depth: depth.saturating_sub(1),
                        }
                    }
                    '>' if depth == 0 => self.finish_markup(),
                    _ => {}
                }
            }
            LexState::ProcessingInstruction { question } => {
                self.append(ch);
                if question && ch == '>' {
                    self.finish_markup();
                } else {
                    self.state.lex = LexState::ProcessingInstruction {
                        question: ch == '?',
                    };
                }
            }
            LexState::TagName => {
                if is_name_char(ch) {
                    self.append(ch);
                } else {
                    let name = self.pending_name();
                    self.flush();
                    self.state.open_elements.push(name);
                    self.state.lex = LexState::InsideTag;
                    return Step::Reprocess;
                }
            }
            LexState::InsideTag => match ch {
                c if is_xml_whitespace(c) => self.whitespace_char(c),
                '>' => {
                    self.emit(SyntaxKind::GT, ch);
                    self.state.lex = LexState::Content;
                }
                '/' => {
                    self.begin(SyntaxKind::SLASH_GT, ch);
                    self.state.lex = LexState::SelfClosing;
                }
                '"' | '\'' => {
                    self.begin(SyntaxKind::ATTRIBUTE_VALUE, ch);
                    self.error_at(ErrorCode::E0101, "attribute value without a name", offset);
                    self.state.current_attribute = None;
                    self.state.lex = LexState::AttributeValue { quote: ch };
                }
                '<' => {
                    self.flush();
                    self.error_at(ErrorCode::E0201, "tag is not terminated", offset);
                    self.state.lex = LexState::Content;
                    return Step::Reprocess;
                }
                c if is_name_start_char(c) => {
                    self.begin(SyntaxKind::NAME, c);
                    self.state.lex = LexState::AttributeName;
                }
                _ => {
                    self.emit(SyntaxKind::ERROR, ch);
                    self.error_at(
                        ErrorCode::E0101,
                        format!("unexpected character '{ch}' in tag"),
                        offset,
                    );
                }
            },
            LexState::SelfClosing => {
                if ch == '>' {
                    self.append(ch);
                    self.flush();
                    self.state.open_elements.pop();
                    self.state.lex = LexState::Content;
                } else {
                    self.retag_pending(SyntaxKind::ERROR);
                    self.flush();
                    self.error_at(ErrorCode::E0101, "'/' is not followed by '>'", offset);
                    self.state.lex = LexState::InsideTag;
                    return Step::Reprocess;
                }
            }
            LexState::AttributeName => {
                if is_name_char(ch) {
                    self.append(ch);
                } else {
                    let name = self.pending_name();
                    self.flush();
                    self.state.current_attribute = Some(name);
                    self.state.lex = LexState::AfterAttributeName;
                    return Step::Reprocess;
                }
            }
            LexState::AfterAttributeName => match ch {
                c if is_xml_whitespace(c) => self.whitespace_char(c),
                '=' => {
                    self.emit(SyntaxKind::EQ, ch);
                    self.state.lex = LexState::BeforeAttributeValue;
                }
                _ => {
                    self.flush();
                    let name = self.state.current_attribute.take().unwrap_or_default();
                    self.error_at(
                        ErrorCode::E0107,
                        format!("attribute '{name}' has no value"),
                        offset,
                    );
                    self.state.lex = LexState::InsideTag;
                    return Step::Reprocess;
                }
            },
            LexState::BeforeAttributeValue => match ch {
                c if is_xml_whitespace(c) => self.whitespace_char(c),
                '"' | '\'' => {
                    self.begin(SyntaxKind::ATTRIBUTE_VALUE, ch);
                    self.state.lex = LexState::AttributeValue { quote: ch };
                }
                '>' | '/' | '<' => {
                    self.flush();
                    self.state.current_attribute = None;
                    self.error_at(ErrorCode::E0107, "missing attribute value", offset);
                    self.state.lex = LexState::InsideTag;
                    return Step::Reprocess;
                }
                _ => {
                    self.begin(SyntaxKind::ATTRIBUTE_VALUE, ch);
                    self.error_at(
                        ErrorCode::E0106,
                        "attribute value must be quoted",
                        offset,
                    );
                    self.state.lex = LexState::UnquotedAttributeValue;
                }
            },
            LexState::AttributeValue { quote } => {
                if ch == '<' {
                    self.flush();
                    self.state.current_attribute = None;
                    self.error_at(
                        ErrorCode::E0102,
                        "attribute value is not terminated",
                        offset,
                    );
                    self.state.lex = LexState::Content;
                    return Step::Reprocess;
                }
                self.append(ch);
                if ch == quote {
                    self.flush();
                    self.state.current_attribute = None;
                    self.state.lex = LexState::InsideTag;
                }
            }
            LexState::UnquotedAttributeValue => {
                if is_xml_whitespace(ch) || matches!(ch, '>' | '<') {
                    self.flush();
                    self.state.current_attribute = None;
                    self.state.lex = LexState::InsideTag;
                    return Step::Reprocess;
                }
                self.append(ch);
            }
            LexState::EndTagOpen => {
                if is_name_start_char(ch) {
                    self.begin(SyntaxKind::NAME, ch);
                    self.state.lex = LexState::EndTagName;
                } else {
                    self.error_at(ErrorCode::E0101, "end tag has no name", offset);
                    self.state.lex = LexState::InsideEndTag;
                    return Step::Reprocess;
                }
            }
            LexState::EndTagName => {
                if is_name_char(ch) {
                    self.append(ch);
                } else {
                    let name = self.pending_name();
                    self.flush();
                    self.close_element(&name);
                    self.state.lex = LexState::InsideEndTag;
                    return Step::Reprocess;
                }
            }
            LexState::InsideEndTag => match ch {
                c if is_xml_whitespace(c) => self.whitespace_char(c),
                '>' => {
                    self.emit(SyntaxKind::GT, ch);
                    self.state.lex = LexState::Content;
                }
                '<' => {
                    self.flush();
                    self.error_at(ErrorCode::E0201, "tag is not terminated", offset);
                    self.state.lex = LexState::Content;
                    return Step::Reprocess;
                }
                _ => {
                    self.emit(SyntaxKind::ERROR, ch);
                    self.error_at(
                        ErrorCode::E0101,
                        format!("unexpected character '{ch}' in end tag"),
                        offset,
                    );
                }
            },
        }
        Step::Consumed
    }

    // =========================================================================
    // Token log helpers
    // =========================================================================

    fn content_char(&mut self, ch: char) {
        let kind = if is_xml_whitespace(ch) {
            SyntaxKind::WHITESPACE
        } else {
            SyntaxKind::TEXT
        };
        match &mut self.state.pending {
            Some(p) if p.kind == SyntaxKind::TEXT || p.kind == SyntaxKind::WHITESPACE => {
                p.text.push(ch);
                if kind == SyntaxKind::TEXT {
                    p.kind = SyntaxKind::TEXT;
                }
            }
            _ => self.begin(kind, ch),
        }
    }

    fn whitespace_char(&mut self, ch: char) {
        match &mut self.state.pending {
            Some(p) if p.kind == SyntaxKind::WHITESPACE => p.text.push(ch),
            _ => self.begin(SyntaxKind::WHITESPACE, ch),
        }
    }

    /// Start a new pending token with `ch` at the current offset.
    fn begin(&mut self, kind: SyntaxKind, ch: char) {
        self.flush();
        self.state.pending = Some(PendingToken {
            kind,
            start: self.state.offset,
            text: ch.to_string(),
        });
    }

    fn append(&mut self, ch: char) {
        if let Some(p) = &mut self.state.pending {
            p.text.push(ch);
        }
    }

    fn retag_pending(&mut self, kind: SyntaxKind) {
        if let Some(p) = &mut self.state.pending {
            p.kind = kind;
        }
    }

    fn pending_text(&self) -> &str {
        self.state
            .pending
            .as_ref()
            .map(|p| p.text.as_str())
            .unwrap_or("")
    }

    fn pending_name(&self) -> SmolStr {
        SmolStr::new(self.pending_text())
    }

    /// Emit a single-character token at the current offset.
    fn emit(&mut self, kind: SyntaxKind, ch: char) {
        self.begin(kind, ch);
        self.flush();
    }

    fn flush(&mut self) {
        if let Some(p) = self.state.pending.take() {
            self.tokens.push(Token {
                kind: p.kind,
                text: SmolStr::new(p.text),
                offset: p.start,
            });
        }
    }

    fn finish_markup(&mut self) {
        self.flush();
        self.state.lex = LexState::Content;
    }

    fn close_element(&mut self, name: &str) {
        if let Some(pos) = self
            .state
            .open_elements
            .iter()
            .rposition(|open| open == name)
        {
            self.state.open_elements.truncate(pos);
        }
    }

    fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, offset: TextSize) {
        self.diagnostics
            .push(Diagnostic::at_offset(code, message, offset));
    }
}
