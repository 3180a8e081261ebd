//! Bidirectional translation between typed C expressions and Z3 formulas.
//!
//! The entry point is [`conv::Z3ConvSession`]. Expressions live in an
//! [`ast::AstContext`], and formulas in a [`z3::Context`], both of which are
//! owned by the caller and outlive the session.

pub mod ast;
pub mod config;
pub mod conv;
mod utils;

pub use common::z3::{AstExt, AstNode, AstNodeSort};
pub use conv::Z3ConvSession;
pub use utils::logging::init_logging;
