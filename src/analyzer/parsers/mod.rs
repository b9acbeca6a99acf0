pub mod common;
pub mod expression;
pub mod function;
pub mod statement;

pub use common::*;
pub use expression::*;
pub use function::*;
pub use statement::*;
