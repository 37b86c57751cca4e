//! Index types for ship elements.
//!
//! Every container in the pipeline is a flat array, and elements refer to
//! each other by position. These wrappers keep a point index from being
//! used where a spring index is expected. All ids share one 32-bit
//! representation; absence is expressed with `Option`, never a sentinel.

use std::fmt::{self, Debug};

/// The underlying integer type of every element index.
pub type ElementIndex = u32;

/// A type-safe point index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PointId(ElementIndex);

/// A type-safe spring index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SpringId(ElementIndex);

/// A type-safe triangle index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TriangleId(ElementIndex);

/// A type-safe frontier index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FrontierId(ElementIndex);

/// A type-safe electrical element index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ElectricalElementId(ElementIndex);

/// A type-safe structural material index into a material database.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct StructuralMaterialId(ElementIndex);

/// A type-safe electrical material index into a material database.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ElectricalMaterialId(ElementIndex);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(
                    index < ElementIndex::MAX as usize,
                    "index {} too large for {}",
                    index,
                    stringify!($name)
                );
                Self(index as ElementIndex)
            }

            /// Get the index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw value of the underlying type.
            #[inline]
            pub fn raw(self) -> ElementIndex {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(PointId, "P");
impl_index_type!(SpringId, "S");
impl_index_type!(TriangleId, "T");
impl_index_type!(FrontierId, "F");
impl_index_type!(ElectricalElementId, "EE");
impl_index_type!(StructuralMaterialId, "SM");
impl_index_type!(ElectricalMaterialId, "EM");
