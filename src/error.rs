use miette::Diagnostic;
use thiserror::Error;

/// Main error type for angora operations
#[derive(Error, Diagnostic, Debug)]
pub enum AngoraError {
    #[error("Environment unavailable: {message}")]
    #[diagnostic(
        code(angora::environment),
        help("Call Environment::install() once at startup before loading bundles")
    )]
    EnvironmentUnavailable { message: String },

    #[error("Binding conflict on `{name}`: {message}")]
    #[diagnostic(code(angora::binding))]
    BindingConflict { name: String, message: String },

    #[error("Reserved binding `{name}` cannot be exported by bundle `{bundle}`")]
    #[diagnostic(
        code(angora::reserved),
        help("`colors` and `pushColors` are owned by angora; rename the export")
    )]
    ReservedBinding { name: String, bundle: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(angora::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(angora::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(angora::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(angora::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, AngoraError>;
