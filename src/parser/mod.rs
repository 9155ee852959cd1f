//! Declaration parsing for Go source files.
//!
//! The router engine never needs full Go semantics: it only looks at the
//! package clause, type declarations, function/method declarations (with
//! their receivers) and the comment block attached to each of them.
//! [`DeclarationParser`] is the seam between that declaration tree and the
//! rest of the pipeline; [`go::GoParser`] is the implementation for Go.
//!
//! # Example
//!
//! ```no_run
//! use godo::parser::{DeclarationParser, go::GoParser};
//! use std::path::Path;
//!
//! let parsed = GoParser.parse_file(Path::new("api/controller/user.go")).unwrap();
//! for ty in &parsed.source.types {
//!     println!("type {}", ty.name);
//! }
//! ```

pub mod go;

use crate::error::{Error, ParseError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Turns source text into a [`SourceFile`].
pub trait DeclarationParser {
    /// Parses source text. Pure function of its input.
    fn parse_source(&self, source: &str) -> std::result::Result<SourceFile, ParseError>;

    /// Reads and parses a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`]
    /// if its contents are not valid declaration syntax.
    fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let source = self.parse_source(&content).map_err(|e| Error::Parse {
            file: path.to_path_buf(),
            source: e,
        })?;

        debug!(
            "Parsed {}: package {}, {} types, {} funcs",
            path.display(),
            source.package,
            source.types.len(),
            source.funcs.len()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A successfully parsed source file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The declaration tree
    pub source: SourceFile,
}

/// Top-level declarations of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause
    pub package: String,
    pub types: Vec<TypeDecl>,
    /// Plain functions and methods, in source order
    pub funcs: Vec<FuncDecl>,
}

impl SourceFile {
    /// Methods whose receiver base type is `type_name`, value or pointer.
    pub fn methods_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a FuncDecl> + 'a {
        self.funcs
            .iter()
            .filter(move |f| f.receiver.as_deref() == Some(type_name))
    }

    /// Whether `type_name` already declares `method_name` in this file.
    pub fn has_method(&self, type_name: &str, method_name: &str) -> bool {
        self.methods_of(type_name).any(|f| f.name == method_name)
    }
}

/// A `type` spec, alone or inside a `type ( ... )` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub doc: Option<DocComment>,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver base type name with pointer, parentheses and type arguments
    /// stripped; `None` for plain functions
    pub receiver: Option<String>,
    pub doc: Option<DocComment>,
}

/// The comment group attached directly above a declaration.
///
/// Lines have their comment markers removed but are otherwise untrimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub lines: Vec<String>,
}

impl DocComment {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}
