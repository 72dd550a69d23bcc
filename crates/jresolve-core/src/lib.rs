//! Symbol tables and name resolution for Java source code.
//!
//! Source files are parsed into [`syntax::CompilationUnit`]s, from which
//! [`semantic::SemanticModel::build_all`] constructs the symbol graph and
//! scope tree, completes the type hierarchy and binds every name occurrence
//! to its declaration.

pub mod config;
pub mod parser;
pub mod semantic;
pub mod syntax;

pub use config::Config;
pub use parser::{ParseError, ParsedFile};
pub use semantic::{BuildError, SemanticModel};

/// Parses and models a set of `(filename, source)` pairs with `config`.
pub fn analyze_sources<'a>(
    sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    config: &Config,
) -> Result<SemanticModel, BuildError> {
    let units: Vec<syntax::CompilationUnit> = sources
        .into_iter()
        .map(|(filename, source)| ParsedFile::from_source(filename, source).into_unit())
        .collect();
    SemanticModel::build_all(&units, config)
}
