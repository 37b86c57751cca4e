//! Error types for shipmesh.
//!
//! Every failure of the construction pipeline surfaces as a [`BuildError`].
//! A failed build never yields a partially constructed ship.

use thiserror::Error;

use crate::definition::materials::MaterialUniqueType;

/// Result type alias using [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while building a ship.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The structural layer has no occupied cell.
    #[error("ship contains no cells that may be recognized as structural material")]
    EmptyShip,

    /// An overlay layer does not have the structural layer's size.
    #[error("{layer} layer is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    LayerSizeMismatch {
        /// Name of the mismatching layer.
        layer: &'static str,
        /// Expected width.
        expected_width: i32,
        /// Expected height.
        expected_height: i32,
        /// Actual width.
        actual_width: i32,
        /// Actual height.
        actual_height: i32,
    },

    /// A rope endpoint cannot be resolved to a grid point.
    #[error("rope {rope} has an endpoint at ({x}, {y}) that does not resolve to a point")]
    MalformedRope {
        /// Index of the rope in the rope layer.
        rope: usize,
        /// Endpoint x coordinate.
        x: i32,
        /// Endpoint y coordinate.
        y: i32,
    },

    /// An electrical cell has no structural point beneath it.
    #[error("electrical element at ({x}, {y}) is not on a structural cell")]
    OrphanElectricalElement {
        /// Cell x coordinate.
        x: i32,
        /// Cell y coordinate.
        y: i32,
    },

    /// Two instanced electrical elements share an instance index.
    #[error("electrical instance index {instance_index} is used at both ({first_x}, {first_y}) and ({second_x}, {second_y})")]
    DuplicateElectricalInstance {
        /// The duplicated instance index.
        instance_index: u32,
        /// First cell x coordinate.
        first_x: i32,
        /// First cell y coordinate.
        first_y: i32,
        /// Second cell x coordinate.
        second_x: i32,
        /// Second cell y coordinate.
        second_y: i32,
    },

    /// Panel metadata names an instance index no electrical element carries.
    #[error("index '{instance_index}' of electrical panel metadata cannot be found among electrical element indices")]
    BrokenPanelMetadata {
        /// The dangling instance index.
        instance_index: u32,
    },

    /// The material database lacks a unique material the ship needs.
    #[error("material database has no unique {unique_type:?} material")]
    MissingUniqueMaterial {
        /// The missing unique material type.
        unique_type: MaterialUniqueType,
    },

    /// Frontier tracing could not close a loop.
    #[error("frontier invariant violated: {details}")]
    FrontierInvariant {
        /// Description of the violation.
        details: String,
    },

    /// A final triangle is not clockwise.
    #[error("triangle {triangle} is not clockwise")]
    TriangleOrientation {
        /// Index of the offending triangle.
        triangle: usize,
    },

    /// Internal consistency failure between pipeline stages.
    #[error("invariant violated: {details}")]
    InvariantViolation {
        /// Description of the violation.
        details: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl BuildError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        BuildError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an invariant violation error.
    pub(crate) fn invariant(details: impl Into<String>) -> Self {
        BuildError::InvariantViolation {
            details: details.into(),
        }
    }

    /// Create a frontier invariant error.
    pub(crate) fn frontier(details: impl Into<String>) -> Self {
        BuildError::FrontierInvariant {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_metadata_message() {
        let e = BuildError::BrokenPanelMetadata { instance_index: 7 };
        assert_eq!(
            e.to_string(),
            "index '7' of electrical panel metadata cannot be found among electrical element indices"
        );
    }

    #[test]
    fn test_invalid_param() {
        let e = BuildError::invalid_param("stripe_height", 1, "must be at least 2");
        assert_eq!(
            e.to_string(),
            "invalid parameter: stripe_height = 1 (must be at least 2)"
        );
    }
}
