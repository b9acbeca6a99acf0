//! # Tokenizer Component
//!
//! Lexical analysis of rule files: raw text in, a flat ordered stream of
//! [`Token`](token::Token)s out, each tagged with its 1-based source line.
//!
//! ## Rules
//!
//! * Lines starting with `;` are comments and are dropped whole (see
//!   [`crate::preprocessor`]).
//! * Each delimiter of `# @ : ; = < > + . , " ( )` and the space character is
//!   isolated into its own token.
//! * Runs of tabs, carriage returns and newlines separate tokens but produce none.
//! * Everything else is grouped into word tokens.
//!
//! The tokenizer never classifies words; keywords, identifiers and numbers are
//! recognized by the parser.
//!
//! ## Component Structure
//!
//! * [`token`]: token type and the tokenizer driver
//! * [`symbol`]: the delimiter set
//! * [`keyword`]: reserved words used by the parser
//! * [`whitespace`]: blank handling
//!
//! ## Usage Example
//!
//! ```rust
//! use kensa::tokenizer::token::Tokenizer;
//!
//! let tokens = Tokenizer::new().tokenize("@Rule:\nEND").unwrap();
//! assert_eq!(tokens.len(), 4);
//! assert_eq!(tokens[3].line, 2);
//! ```

pub mod keyword;
pub mod symbol;
pub mod token;
pub mod whitespace;
