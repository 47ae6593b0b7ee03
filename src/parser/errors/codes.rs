//! Error code definitions for diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (tokenizer)
//! - E02xx: Structural errors (element nesting)
//! - E03xx: Project model errors (MSBuild semantics)

use std::fmt;

/// Error codes for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Character that cannot appear at this point of the markup
    E0101,
    /// Attribute value missing its closing quote
    E0102,
    /// Comment missing its `-->`
    E0103,
    /// CDATA section missing its `]]>`
    E0104,
    /// Processing instruction or declaration not terminated
    E0105,
    /// Attribute value not enclosed in quotes
    E0106,
    /// Attribute without a value
    E0107,

    // =========================================================================
    // E02xx: Structural errors
    // =========================================================================
    /// Start or end tag not terminated by `>`
    E0201,
    /// Element never closed
    E0202,
    /// End tag that matches no open element
    E0203,
    /// More than one root element
    E0204,
    /// Character data outside the root element
    E0205,
    /// Document without a root element
    E0206,

    // =========================================================================
    // E03xx: Project model errors
    // =========================================================================
    /// Root element is not `Project`
    E0301,
    /// `Target` without a `Name`
    E0302,
    /// Target defined twice
    E0303,
    /// `Import` without a `Project` attribute
    E0304,
    /// Item without `Include`, `Update` or `Remove`
    E0305,
    /// Property value does not match the schema's declared kind
    E0306,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0105 => "E0105",
            Self::E0106 => "E0106",
            Self::E0107 => "E0107",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            Self::E0206 => "E0206",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
            Self::E0305 => "E0305",
            Self::E0306 => "E0306",
        }
    }

    /// Get the category description
    pub fn category_description(&self) -> &'static str {
        match self.as_str().as_bytes()[2] {
            b'1' => "Lexical error",
            b'2' => "Structural error",
            _ => "Project error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
