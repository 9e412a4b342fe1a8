// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Error types for the directive parser and the module host.
//!
//! None of these abort processing on their own. The command line records
//! [`DirectiveError`]s as diagnostics and keeps going; [`InterfaceError`] is
//! returned to the host, which decides whether it can continue.

use std::path::PathBuf;
use thiserror::Error;

/// A problem met while expanding `@file` directives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// The parameter file could not be opened or read.
    #[error("Parameter file '{path}' not found, skipping...")]
    FileNotFound { path: String },

    /// The parameter file is already being expanded further up the chain.
    #[error("Parameter file '{}' includes itself, skipping...", path.display())]
    CycleDetected { path: PathBuf },

    /// Nesting went deeper than the configured bound.
    #[error("Parameter file '{path}' nested deeper than {limit} levels, skipping...")]
    DepthExceeded { path: String, limit: usize },
}

/// Why an interface could not be obtained from a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterfaceError {
    #[error("module '{module}' is not loaded")]
    NotLoaded { module: String },

    #[error("failed to retrieve \"{name}\" interface")]
    NotFound { name: String },

    /// The module exports the interface family, but not this version.
    #[error("interface \"{requested}\" is not available, module provides \"{available}\"")]
    VersionMismatch { requested: String, available: String },
}
