//! Syntax kinds for the Rowan-based XML CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Tokens are produced by the character-fed [`XmlCursor`](super::XmlCursor);
//! nodes are produced by the tree builder at end of input.

/// All syntax kinds (tokens and nodes) of an XML document
///
/// Tokens are leaves (names, punctuation, text runs).
/// Nodes are composite (elements, tags, attributes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    COMMENT,                // <!-- ... -->

    // =========================================================================
    // CONTENT
    // =========================================================================
    TEXT,                   // character data between tags
    CDATA,                  // <![CDATA[ ... ]]>
    PROCESSING_INSTRUCTION, // <? ... ?>
    DECLARATION,            // <!DOCTYPE ... >

    // =========================================================================
    // MARKUP
    // =========================================================================
    LT,                     // <
    LT_SLASH,               // </
    GT,                     // >
    SLASH_GT,               // />
    EQ,                     // =
    NAME,                   // element or attribute name
    ATTRIBUTE_VALUE,        // "..." or '...', quotes included

    /// A character the tokenizer could not place
    ERROR,

    // =========================================================================
    // NODES
    // =========================================================================
    DOCUMENT,
    ELEMENT,
    START_TAG,
    END_TAG,
    ATTRIBUTE,
    /// Markup that could not be attached to the tree (e.g. a stray end tag)
    ERROR_NODE,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is trivia (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::COMMENT)
    }

    /// Check if this kind is a token (leaf) rather than a node
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::ERROR as u16)
    }

    /// Check if this is markup punctuation
    pub fn is_punct(self) -> bool {
        matches!(
            self,
            Self::LT | Self::LT_SLASH | Self::GT | Self::SLASH_GT | Self::EQ
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum XmlLanguage {}

impl rowan::Language for XmlLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<XmlLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<XmlLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<XmlLanguage>;
