//! File-system front door: find `.jack` sources and write sibling `.vm` files.

use crate::compiler::{compile_unit, CompileError, CompilerOptions};
use crate::lexer::LexerWarning;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const SOURCE_EXTENSION: &str = "jack";
pub const OUTPUT_EXTENSION: &str = "vm";

/// Driver error types
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to access '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("no .jack files found in '{0}'")]
    NoSources(PathBuf),

    #[error("an explicit output path needs a single source file, but '{0}' is a directory")]
    OutputForDirectory(PathBuf),

    #[error("failed to compile '{0}': {1}")]
    Compile(PathBuf, #[source] CompileError),
}

/// Result of compiling one source file
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub source: PathBuf,
    pub output: PathBuf,
    pub code: String,
    pub warnings: Vec<LexerWarning>,
}

/// List the units under `input`: the file itself, or every `.jack` file
/// directly inside a directory, sorted by name.
/// # Errors
/// Fails if the directory can't be read or holds no sources
pub fn collect_sources(input: &Path) -> Result<Vec<PathBuf>, DriverError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let entries = fs::read_dir(input).map_err(|e| DriverError::Io(input.to_path_buf(), e))?;
    let mut sources = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| DriverError::Io(input.to_path_buf(), e))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            sources.push(path);
        }
    }

    if sources.is_empty() {
        return Err(DriverError::NoSources(input.to_path_buf()));
    }
    sources.sort();
    Ok(sources)
}

/// Compile one file. Nothing is written unless the whole unit compiles.
/// # Errors
/// Read, compile, and write failures
pub fn compile_file(
    source: &Path,
    output: &Path,
    options: CompilerOptions,
) -> Result<CompiledUnit, DriverError> {
    let text = fs::read_to_string(source).map_err(|e| DriverError::Io(source.to_path_buf(), e))?;

    let compilation =
        compile_unit(&text, options).map_err(|e| DriverError::Compile(source.to_path_buf(), e))?;
    for warning in &compilation.warnings {
        warn!(file = %source.display(), "{warning}");
    }

    fs::write(output, &compilation.code).map_err(|e| DriverError::Io(output.to_path_buf(), e))?;
    info!(source = %source.display(), output = %output.display(), "wrote VM code");

    Ok(CompiledUnit {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        code: compilation.code,
        warnings: compilation.warnings,
    })
}

/// Compile a file or directory. Each unit gets its own compiler; the first
/// failing unit stops the run.
/// # Errors
/// See [`collect_sources`] and [`compile_file`]
pub fn compile_path(
    input: &Path,
    output: Option<&Path>,
    options: CompilerOptions,
) -> Result<Vec<CompiledUnit>, DriverError> {
    if let Some(output) = output {
        if input.is_dir() {
            return Err(DriverError::OutputForDirectory(input.to_path_buf()));
        }
        return Ok(vec![compile_file(input, output, options)?]);
    }

    collect_sources(input)?
        .into_iter()
        .map(|source| {
            let output = source.with_extension(OUTPUT_EXTENSION);
            compile_file(&source, &output, options)
        })
        .collect()
}
