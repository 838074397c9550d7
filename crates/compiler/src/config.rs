//! Build-driver configuration.
//!
//! Controls how [`compile_file`](crate::compile_file) assembles and links
//! the emitted assembly. The assembly text itself never depends on
//! configuration; only the external toolchain invocation does.
//!
//! # Example
//!
//! ```rust,ignore
//! use minicc::CompilerConfig;
//!
//! let config = CompilerConfig::new()
//!     .with_cc("clang")
//!     .with_library_path("/opt/lib")
//!     .with_library("m");
//! minicc::compile_file(&input, &output, &config)?;
//! ```

use serde::Deserialize;

/// Configuration for the assemble-and-link step.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// C compiler driver used to assemble and link (`cc` by default)
    pub cc: String,

    /// Additional library search paths (`-L`)
    pub library_paths: Vec<String>,

    /// Additional libraries to link (`-l`)
    pub libraries: Vec<String>,

    /// Keep the intermediate `.s` file next to the output
    pub keep_asm: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            cc: "cc".to_string(),
            library_paths: Vec::new(),
            libraries: Vec::new(),
            keep_asm: false,
        }
    }
}

impl CompilerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        CompilerConfig::default()
    }

    /// Use a different C compiler driver (builder pattern).
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }

    /// Add a library search path.
    pub fn with_library_path(mut self, path: impl Into<String>) -> Self {
        self.library_paths.push(path.into());
        self
    }

    /// Add a library to link.
    pub fn with_library(mut self, lib: impl Into<String>) -> Self {
        self.libraries.push(lib.into());
        self
    }

    /// Keep the intermediate assembly file.
    pub fn with_keep_asm(mut self, keep: bool) -> Self {
        self.keep_asm = keep;
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid compiler configuration: {}", e))
    }
}
