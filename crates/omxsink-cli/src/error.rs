// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line arguments
    InvalidArgs(String),
    /// VideoCore libraries could not be loaded
    LibraryUnavailable(String),
    /// The video_render component could not be created
    ComponentUnavailable(String),
    /// The hardware rejected the requested configuration
    Configuration(String),
    /// Hardware buffers could not be allocated
    OutOfMemory(String),
    /// Input file error
    Io(String),
    /// General error from the omxsink library
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::LibraryUnavailable(msg) => write!(f, "Library unavailable: {}", msg),
            CliError::ComponentUnavailable(msg) => write!(f, "Component unavailable: {}", msg),
            CliError::Configuration(msg) => write!(f, "Configuration rejected: {}", msg),
            CliError::OutOfMemory(msg) => write!(f, "Out of memory: {}", msg),
            CliError::Io(msg) => write!(f, "I/O error: {}", msg),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            CliError::InvalidArgs(_) => 2,
            CliError::LibraryUnavailable(_) => 3,
            CliError::ComponentUnavailable(_) => 4,
            CliError::Configuration(_) => 5,
            CliError::OutOfMemory(_) => 6,
            CliError::Io(_) => 7,
            CliError::General(_) => 1,
        }
    }
}

/// Map omxsink::Error to CliError with appropriate exit codes
impl From<omxsink::Error> for CliError {
    fn from(err: omxsink::Error) -> Self {
        use omxsink::Error;

        match err {
            Error::LibraryNotLoaded(lib_err) => {
                CliError::LibraryUnavailable(format!("Failed to load library: {}", lib_err))
            }
            Error::ComponentCreation(omx_err) => CliError::ComponentUnavailable(format!(
                "{}: {}",
                omxsink::display::VIDEO_RENDER_COMPONENT,
                omx_err
            )),
            err @ (Error::Configuration(_) | Error::GeometryMismatch { .. }) => {
                CliError::Configuration(err.to_string())
            }
            Error::OutOfMemory(omx_err) => CliError::OutOfMemory(omx_err.to_string()),
            err @ (Error::NotInitialized(_) | Error::InvalidState(_)) => {
                CliError::General(err.to_string())
            }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

/// Helper function to convert result to exit code
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omxsink::component::{Geometry, OmxError};

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::InvalidArgs("test".into()).code(), 2);
        assert_eq!(CliError::LibraryUnavailable("test".into()).code(), 3);
        assert_eq!(CliError::ComponentUnavailable("test".into()).code(), 4);
        assert_eq!(CliError::Configuration("test".into()).code(), 5);
        assert_eq!(CliError::OutOfMemory("test".into()).code(), 6);
        assert_eq!(CliError::Io("test".into()).code(), 7);
        assert_eq!(CliError::General("test".into()).code(), 1);
    }

    #[test]
    fn test_library_error_mapping() {
        let err: CliError = omxsink::Error::ComponentCreation(OmxError::COMPONENT_NOT_FOUND).into();
        assert!(matches!(err, CliError::ComponentUnavailable(_)));

        let err: CliError = omxsink::Error::GeometryMismatch {
            requested: Geometry::new(1920, 1080, 1920),
            reported: Geometry::new(1920, 1088, 1920),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration rejected: could not set requested resolution 1920x1080 stride 1920, port reports 1920x1088 stride 1920"
        );

        let err: CliError = omxsink::Error::OutOfMemory(OmxError::INSUFFICIENT_RESOURCES).into();
        assert!(matches!(err, CliError::OutOfMemory(_)));
    }
}
