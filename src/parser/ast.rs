//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.

use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

// ============================================================================
// Document
// ============================================================================

ast_node!(XmlDocument, DOCUMENT);

impl XmlDocument {
    /// The first top-level element
    pub fn root(&self) -> Option<XmlElement> {
        self.0.children().find_map(XmlElement::cast)
    }
}

// ============================================================================
// Element
// ============================================================================

ast_node!(XmlElement, ELEMENT);

impl XmlElement {
    pub fn start_tag(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::START_TAG)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        first_token(&self.start_tag()?, SyntaxKind::NAME)
    }

    pub fn name(&self) -> Option<SmolStr> {
        self.name_token().map(|t| SmolStr::new(t.text()))
    }

    pub fn attributes(&self) -> impl Iterator<Item = XmlAttribute> + use<> {
        self.start_tag()
            .into_iter()
            .flat_map(|tag| tag.children().filter_map(XmlAttribute::cast))
    }

    /// Value of the first attribute called `name`
    pub fn attribute(&self, name: &str) -> Option<SmolStr> {
        self.attributes()
            .find(|a| a.name().as_deref() == Some(name))
            .and_then(|a| a.value())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = XmlElement> + use<> {
        self.0.children().filter_map(XmlElement::cast)
    }

    /// Concatenated character data directly inside this element, trimmed
    pub fn text(&self) -> String {
        let mut text = String::new();
        for token in self
            .0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
        {
            match token.kind() {
                SyntaxKind::TEXT | SyntaxKind::WHITESPACE => text.push_str(token.text()),
                SyntaxKind::CDATA => {
                    let raw = token.text();
                    let inner = raw
                        .strip_prefix("<![CDATA[")
                        .map(|s| s.strip_suffix("]]>").unwrap_or(s))
                        .unwrap_or(raw);
                    text.push_str(inner);
                }
                _ => {}
            }
        }
        text.trim().to_string()
    }

    /// True for `<a/>`
    pub fn is_self_closing(&self) -> bool {
        self.start_tag()
            .and_then(|tag| tag.last_token())
            .is_some_and(|t| t.kind() == SyntaxKind::SLASH_GT)
    }
}

// ============================================================================
// Attribute
// ============================================================================

ast_node!(XmlAttribute, ATTRIBUTE);

impl XmlAttribute {
    pub fn name(&self) -> Option<SmolStr> {
        first_token(&self.0, SyntaxKind::NAME).map(|t| SmolStr::new(t.text()))
    }

    /// The value without its quotes; an unterminated value keeps what was typed
    pub fn value(&self) -> Option<SmolStr> {
        let token = first_token(&self.0, SyntaxKind::ATTRIBUTE_VALUE)?;
        let raw = token.text();
        let inner = match raw.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &raw[1..];
                body.strip_suffix(quote).unwrap_or(body)
            }
            _ => raw,
        };
        Some(SmolStr::new(inner))
    }
}
