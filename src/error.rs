use std::fmt;

/// A location in the input XML document, 1-based like most editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u64,
    pub column: u64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid type signature {signature:?} at offset {offset}")]
    InvalidSignature { signature: String, offset: usize },

    #[error("invalid {what} name {name:?}")]
    InvalidName { what: &'static str, name: String },

    #[error("{location}: missing attribute {attribute:?} on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        location: Location,
    },

    #[error("{location}: illegal value {value:?} for annotation {annotation:?}")]
    IllegalAnnotation {
        annotation: String,
        value: String,
        location: Location,
    },

    #[error(
        "{interface}: {kind} {symbol:?} is generated by both {first:?} and {second:?}"
    )]
    DuplicateSymbol {
        interface: String,
        kind: &'static str,
        symbol: String,
        first: String,
        second: String,
    },

    #[error("xml parse error: {0}")]
    Xml(#[from] xml::reader::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
