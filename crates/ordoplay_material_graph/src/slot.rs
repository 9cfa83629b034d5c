// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot definitions for node inputs/outputs.

use crate::config::Precision;
use serde::{Deserialize, Serialize};

/// Slot direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotDirection {
    /// Input slot
    Input,
    /// Output slot
    Output,
}

/// Value type declared on a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotValueType {
    /// Scalar
    Vector1,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector / Color
    Vector4,
    /// Width decided by type resolution
    Dynamic,
    /// Texture sampler
    Texture2D,
}

impl SlotValueType {
    /// Whether the concrete type is decided at generation time
    pub fn is_dynamic(self) -> bool {
        self == Self::Dynamic
    }

    /// The concrete type, or `None` for [`SlotValueType::Dynamic`]
    pub fn to_concrete(self) -> Option<ConcreteSlotValueType> {
        match self {
            Self::Vector1 => Some(ConcreteSlotValueType::Vector1),
            Self::Vector2 => Some(ConcreteSlotValueType::Vector2),
            Self::Vector3 => Some(ConcreteSlotValueType::Vector3),
            Self::Vector4 => Some(ConcreteSlotValueType::Vector4),
            Self::Texture2D => Some(ConcreteSlotValueType::Texture2D),
            Self::Dynamic => None,
        }
    }

    /// Check if an output of this type can feed an input of `input` type
    pub fn can_connect_to(self, input: SlotValueType) -> bool {
        match (self, input) {
            (Self::Texture2D, Self::Texture2D) => true,
            // Samplers never mix with vectors
            (Self::Texture2D, _) | (_, Self::Texture2D) => false,
            // Vector widths are coerced during generation
            _ => true,
        }
    }
}

/// Slot type after type resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConcreteSlotValueType {
    /// Scalar
    Vector1,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// Texture sampler
    Texture2D,
}

impl ConcreteSlotValueType {
    /// Number of vector components (zero for samplers)
    pub fn components(self) -> usize {
        match self {
            Self::Vector1 => 1,
            Self::Vector2 => 2,
            Self::Vector3 => 3,
            Self::Vector4 => 4,
            Self::Texture2D => 0,
        }
    }

    /// Vector type with the given number of components, clamped to 1..=4
    pub fn from_components(components: usize) -> Self {
        match components {
            0 | 1 => Self::Vector1,
            2 => Self::Vector2,
            3 => Self::Vector3,
            _ => Self::Vector4,
        }
    }

    /// Whether this is one of the vector widths
    pub fn is_vector(self) -> bool {
        self != Self::Texture2D
    }

    /// Dimension token appended to the precision keyword
    pub fn dimension(self) -> &'static str {
        match self {
            Self::Vector1 | Self::Texture2D => "",
            Self::Vector2 => "2",
            Self::Vector3 => "3",
            Self::Vector4 => "4",
        }
    }

    /// Full shading-language type name, e.g. `half3` or `sampler2D`
    pub fn type_name(self, precision: Precision) -> String {
        match self {
            Self::Texture2D => "sampler2D".to_string(),
            _ => format!("{}{}", precision.token(), self.dimension()),
        }
    }
}

/// A slot on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot name, unique within its node
    pub name: String,
    /// Slot direction
    pub direction: SlotDirection,
    /// Declared value type
    pub value_type: SlotValueType,
}

impl Slot {
    /// Create a new slot
    pub fn new(name: impl Into<String>, direction: SlotDirection, value_type: SlotValueType) -> Self {
        Self {
            name: name.into(),
            direction,
            value_type,
        }
    }

    /// Create a new input slot
    pub fn input(name: impl Into<String>, value_type: SlotValueType) -> Self {
        Self::new(name, SlotDirection::Input, value_type)
    }

    /// Create a new output slot
    pub fn output(name: impl Into<String>, value_type: SlotValueType) -> Self {
        Self::new(name, SlotDirection::Output, value_type)
    }

    /// Whether this is an input slot
    pub fn is_input(&self) -> bool {
        self.direction == SlotDirection::Input
    }

    /// Whether this is an output slot
    pub fn is_output(&self) -> bool {
        self.direction == SlotDirection::Output
    }

    /// Concrete type when it does not depend on the graph
    pub fn fixed_concrete_type(&self) -> Option<ConcreteSlotValueType> {
        self.value_type.to_concrete()
    }

    /// Check if this output slot can feed `input`
    pub fn can_connect(&self, input: &Slot) -> bool {
        self.is_output() && input.is_input() && self.value_type.can_connect_to(input.value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_slots_only_connect_to_textures() {
        let sampler = Slot::output("Texture", SlotValueType::Texture2D);
        assert!(sampler.can_connect(&Slot::input("Tex", SlotValueType::Texture2D)));
        assert!(!sampler.can_connect(&Slot::input("UV", SlotValueType::Vector2)));
        assert!(!Slot::output("Out", SlotValueType::Dynamic)
            .can_connect(&Slot::input("Tex", SlotValueType::Texture2D)));
    }

    #[test]
    fn test_vectors_connect_across_widths() {
        let out = Slot::output("Out", SlotValueType::Vector4);
        assert!(out.can_connect(&Slot::input("UV", SlotValueType::Vector2)));
        assert!(out.can_connect(&Slot::input("In", SlotValueType::Dynamic)));
        // Direction matters
        assert!(!out.can_connect(&Slot::output("Other", SlotValueType::Vector4)));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ConcreteSlotValueType::Vector1.type_name(Precision::Half), "half");
        assert_eq!(ConcreteSlotValueType::Vector3.type_name(Precision::Float), "float3");
        assert_eq!(ConcreteSlotValueType::Texture2D.type_name(Precision::Half), "sampler2D");
        assert_eq!(ConcreteSlotValueType::from_components(7), ConcreteSlotValueType::Vector4);
    }
}
