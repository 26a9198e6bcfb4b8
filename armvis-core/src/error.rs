//! Error types for robot description loading and scene evaluation.

use thiserror::Error;

/// Errors that can occur while loading a robot description.
///
/// Any of these aborts the load; no partially built model is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document could not be read from disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML itself is malformed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// A required element is absent.
    #[error("missing required element: {element} in {context}")]
    MissingElement {
        /// The missing element name.
        element: &'static str,
        /// Where the element was expected.
        context: String,
    },

    /// A required attribute is absent.
    #[error("missing required attribute: {attribute} on {element}")]
    MissingAttribute {
        /// The missing attribute name.
        attribute: &'static str,
        /// The element that should carry it.
        element: String,
    },

    /// An attribute is present but its value cannot be used.
    #[error("invalid value for {attribute} on {element}: {message}")]
    InvalidAttribute {
        /// The offending attribute.
        attribute: &'static str,
        /// The element carrying it.
        element: String,
        /// Why the value was rejected.
        message: String,
    },
}

impl ParseError {
    pub fn missing_element(element: &'static str, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element,
            context: context.into(),
        }
    }

    pub fn missing_attribute(attribute: &'static str, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            element: element.into(),
        }
    }

    pub fn invalid_attribute(
        attribute: &'static str,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            attribute,
            element: element.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when evaluating a model against a joint-angle vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The angle vector does not have one entry per joint.
    #[error("expected {expected} joint angles, got {actual}")]
    AngleCount {
        /// Number of joints in the model.
        expected: usize,
        /// Length of the supplied angle vector.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_display() {
        let err = ParseError::missing_attribute("radius", "cylinder");
        assert!(err.to_string().contains("radius"));
        assert!(err.to_string().contains("cylinder"));
    }

    #[test]
    fn test_invalid_attribute_display() {
        let err = ParseError::invalid_attribute("xyz", "origin", "expected 3 values, got 2");
        assert!(err.to_string().contains("xyz"));
        assert!(err.to_string().contains("expected 3 values"));
    }

    #[test]
    fn test_angle_count_display() {
        let err = EvalError::AngleCount {
            expected: 6,
            actual: 5,
        };
        assert_eq!(err.to_string(), "expected 6 joint angles, got 5");
    }
}
