//!
//! Host-Visible Errors
//!
//! Every module error reaches the host as a `ModuleError`: a namespace (the
//! module URI, or `CORE_NAMESPACE` for dispatch errors), a stable code and a
//! human-readable message. Modules keep their own typed error enums and
//! convert at the dispatch boundary.
//!

use thiserror::Error;

/// Namespace for errors raised by the dispatch layer itself
pub const CORE_NAMESPACE: &str = "urn:quarry:core";

pub const CODE_INVALID_ARGUMENT: &str = "INVALID-ARGUMENT";
pub const CODE_UNKNOWN_FUNCTION: &str = "UNKNOWN-FUNCTION";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ModuleError {
    pub namespace: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl ModuleError {
    pub fn new(namespace: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            namespace,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(function: &str, message: impl AsRef<str>) -> Self {
        Self::new(
            CORE_NAMESPACE,
            CODE_INVALID_ARGUMENT,
            format!("{}: {}", function, message.as_ref()),
        )
    }

    pub fn unknown_function(namespace: &str, function: &str) -> Self {
        Self::new(
            CORE_NAMESPACE,
            CODE_UNKNOWN_FUNCTION,
            format!("No function named '{}' in module {}", function, namespace),
        )
    }

    /// Qualified name of the error, `{namespace}#{code}`
    pub fn qualified_code(&self) -> String {
        format!("{}#{}", self.namespace, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ModuleError::new("urn:test", "BROKEN", "it broke");
        assert_eq!(err.to_string(), "BROKEN: it broke");
        assert_eq!(err.qualified_code(), "urn:test#BROKEN");

        let err = ModuleError::invalid_argument("connect", "expected string");
        assert_eq!(err.code, CODE_INVALID_ARGUMENT);
        assert!(err.message.contains("connect"));
        assert!(err.message.contains("expected string"));

        let err = ModuleError::unknown_function("urn:test", "frob");
        assert_eq!(err.code, CODE_UNKNOWN_FUNCTION);
        assert!(err.message.contains("frob"));
    }
}
