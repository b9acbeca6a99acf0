use thiserror::Error;

/// A parser over a slice of `I`, threading the current position explicitly.
///
/// Parsers never mutate shared state: on failure the caller simply retries
/// from the position it still holds, which is what makes ordered choice and
/// nested backtracking safe.
pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input: {message}")]
    UnexpectedEOF {
        message: String,
        position: usize,
        context: Option<String>,
    },
    #[error("Expected: {expected}, found: {parsed}")]
    Unexpected {
        expected: String,
        parsed: String,
        position: usize,
        context: Option<String>,
    },
    #[error("No alternative matched")]
    NoAlternative {
        position: usize,
        context: Option<String>,
    },
    #[error("Parse failed: {message}")]
    Failure {
        message: String,
        position: usize,
        context: Option<String>,
    },
}

impl ParseError {
    /// Index of the token the failure was detected at.
    pub fn get_position(&self) -> usize {
        match self {
            Self::UnexpectedEOF { position, .. }
            | Self::Unexpected { position, .. }
            | Self::NoAlternative { position, .. }
            | Self::Failure { position, .. } => *position,
        }
    }

    pub fn get_context(&self) -> Option<&str> {
        match self {
            Self::UnexpectedEOF { context, .. }
            | Self::Unexpected { context, .. }
            | Self::NoAlternative { context, .. }
            | Self::Failure { context, .. } => context.as_deref(),
        }
    }

    /// Appends an enclosing grammar rule to the context chain, innermost first.
    pub fn with_context(mut self, outer: &str) -> Self {
        let slot = match &mut self {
            Self::UnexpectedEOF { context, .. }
            | Self::Unexpected { context, .. }
            | Self::NoAlternative { context, .. }
            | Self::Failure { context, .. } => context,
        };
        *slot = Some(match slot.take() {
            Some(inner) => format!("{} in {}", inner, outer),
            None => outer.to_string(),
        });
        self
    }

    /// What the parser was looking for, without the context chain.
    pub fn expectation(&self) -> String {
        match self {
            Self::UnexpectedEOF { message, .. } => message.clone(),
            Self::Unexpected { expected, .. } => expected.clone(),
            Self::NoAlternative { context, .. } => context
                .as_deref()
                .map(|c| c.split(" in ").next().unwrap_or(c).to_string())
                .unwrap_or_else(|| "one of several alternatives".to_string()),
            Self::Failure { message, .. } => message.clone(),
        }
    }
}
