//! Traits and errors shared by the model builder and the writers.

use crate::input::tree::{ClassInfo, CompilationUnit, MethodType, Symbol, SymbolId};
use std::borrow::Cow;
use std::fmt;
use std::io;

/// Syntax or operation kind named by an unsupported-construct error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Loop,
    Try,
    MethodReference,
    BinaryOperator,
    UnaryOperator,
    Literal,
    Coercion,
    Statement,
    Expression,
    Invocation,
    Construction,
    Lambda,
    Throw,
    Render,
    Symbol,
    Unit,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::Loop => "loop",
            Construct::Try => "try statement",
            Construct::MethodReference => "method reference",
            Construct::BinaryOperator => "binary operator",
            Construct::UnaryOperator => "unary operator",
            Construct::Literal => "literal",
            Construct::Coercion => "coercion",
            Construct::Statement => "statement",
            Construct::Expression => "expression",
            Construct::Invocation => "method invocation",
            Construct::Construction => "construction",
            Construct::Lambda => "lambda",
            Construct::Throw => "throw",
            Construct::Render => "rendering",
            Construct::Symbol => "symbol",
            Construct::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// Error that aborts the translation of a unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("unsupported {construct}: {detail}")]
    Unsupported { construct: Construct, detail: String },
}

impl TranslateError {
    pub fn unsupported(construct: Construct, detail: impl Into<String>) -> Self {
        TranslateError::Unsupported {
            construct,
            detail: detail.into(),
        }
    }

    /// The construct that could not be translated.
    pub fn construct(&self) -> Construct {
        match self {
            TranslateError::Unsupported { construct, .. } => *construct,
        }
    }
}

/// Supplies a resolved unit and answers symbol and type queries about it.
///
/// Implementations are expected to have finished parsing and attribution;
/// the translator never asks the provider to resolve anything lazily.
pub trait TreeProvider {
    /// The compilation unit being translated.
    fn unit(&self) -> &CompilationUnit;

    /// Original source text of the unit.
    ///
    /// Only used to recover blank lines and comments between statements; a
    /// failure here degrades formatting, never the translation.
    fn source_text(&self) -> io::Result<Cow<'_, str>>;

    /// Resolve a symbol handle.
    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Class metadata by qualified name.
    fn class(&self, qualified_name: &str) -> Option<&ClassInfo>;

    /// Declared signature of a method symbol.
    fn method(&self, id: SymbolId) -> Option<&MethodType>;
}
