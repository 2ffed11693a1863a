/// A rejected argument specification, pinned to the offending record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    /// 1-based line number in the submitted text.
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A non-blank line without the `=>` separator.
    MissingArrow,
    /// A scalar type name outside `int`, `float`, `bool`, `string`.
    UnknownType,
    /// A token that does not convert to its declared type.
    InvalidLiteral,
    /// Wrong delimiters, empty members, unbalanced quotes.
    MalformedComposite,
    /// A map entry without `:`.
    MissingSeparator,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line,
            kind,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::MissingArrow => "missing_arrow",
            ParseErrorKind::UnknownType => "unknown_type",
            ParseErrorKind::InvalidLiteral => "invalid_literal",
            ParseErrorKind::MalformedComposite => "malformed_composite",
            ParseErrorKind::MissingSeparator => "missing_separator",
        }
    }
}
