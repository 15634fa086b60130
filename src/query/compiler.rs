//! Compiler seam
//!
//! Turning a finished `QueryValue` into a wire statement is someone else's
//! job. Implementors receive only queries whose placeholders are resolved
//! (see `QueryValue::compile_with`).

use super::value::QueryValue;

/// Compiles a finished query into an executable statement
pub trait StatementCompiler {
    type Statement;
    type Error;

    fn compile(&self, query: &QueryValue) -> Result<Self::Statement, Self::Error>;
}
