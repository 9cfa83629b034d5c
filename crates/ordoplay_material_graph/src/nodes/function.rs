// SPDX-License-Identifier: MIT OR Apache-2.0
//! N-ary math function nodes.
//!
//! A function node calls one shading-language function on up to three
//! inputs. Functions without a built-in counterpart also contribute a shared
//! definition, emitted once per signature.

use super::{NodeCodegen, SlotDescriptor};
use crate::generation::{NodeContext, NodeError};
use crate::generator::{ShaderGenerator, ShaderSection};
use crate::slot::{Slot, SlotValueType};
use serde::{Deserialize, Serialize};

pub(crate) const INPUT_SLOTS: [&str; 3] = ["Input1", "Input2", "Input3"];
pub(crate) const OUTPUT_SLOT: &str = "Output";

/// Math function applied by a [`FunctionNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathFunction {
    /// `abs(x)`
    Abs,
    /// `sin(x)`
    Sin,
    /// `cos(x)`
    Cos,
    /// `frac(x)`
    Frac,
    /// `saturate(x)`
    Saturate,
    /// `normalize(x)`
    Normalize,
    /// `sqrt(x)`
    Sqrt,
    /// `length(x)`, scalar result
    Length,
    /// `1 - x`
    OneMinus,
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `pow(a, b)`
    Pow,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
    /// `step(edge, x)`
    Step,
    /// `dot(a, b)`, scalar result
    Dot,
    /// `reflect(i, n)`
    Reflect,
    /// `lerp(a, b, t)`
    Lerp,
    /// `clamp(x, min, max)`
    Clamp,
    /// `smoothstep(min, max, x)`
    Smoothstep,
}

impl MathFunction {
    /// Every function, in menu order
    pub const ALL: [MathFunction; 22] = [
        Self::Abs,
        Self::Sin,
        Self::Cos,
        Self::Frac,
        Self::Saturate,
        Self::Normalize,
        Self::Sqrt,
        Self::Length,
        Self::OneMinus,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Pow,
        Self::Min,
        Self::Max,
        Self::Step,
        Self::Dot,
        Self::Reflect,
        Self::Lerp,
        Self::Clamp,
        Self::Smoothstep,
    ];

    /// Number of inputs
    pub fn arity(self) -> usize {
        self.defaults().len()
    }

    /// Literal used for each unconnected input, broadcast to the input width
    pub fn defaults(self) -> &'static [f32] {
        match self {
            Self::Abs
            | Self::Sin
            | Self::Cos
            | Self::Frac
            | Self::Saturate
            | Self::Sqrt
            | Self::OneMinus => &[0.0],
            Self::Normalize | Self::Length => &[1.0],
            Self::Add | Self::Subtract | Self::Min | Self::Max | Self::Step | Self::Dot => &[0.0, 0.0],
            Self::Multiply | Self::Divide | Self::Pow => &[1.0, 1.0],
            Self::Reflect => &[0.0, 1.0],
            Self::Lerp | Self::Smoothstep => &[0.0, 1.0, 0.5],
            Self::Clamp => &[0.0, 0.0, 1.0],
        }
    }

    /// Name used in the emitted call expression
    pub fn function_name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Frac => "frac",
            Self::Saturate => "saturate",
            Self::Normalize => "normalize",
            Self::Sqrt => "sqrt",
            Self::Length => "length",
            Self::OneMinus => "unity_one_minus",
            Self::Add => "unity_add",
            Self::Subtract => "unity_subtract",
            Self::Multiply => "unity_multiply",
            Self::Divide => "unity_divide",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
            Self::Step => "step",
            Self::Dot => "dot",
            Self::Reflect => "reflect",
            Self::Lerp => "lerp",
            Self::Clamp => "clamp",
            Self::Smoothstep => "smoothstep",
        }
    }

    /// Statement body for functions that are not shading-language built-ins
    pub fn definition_body(self) -> Option<&'static str> {
        match self {
            Self::OneMinus => Some("return 1 - arg1;"),
            Self::Add => Some("return arg1 + arg2;"),
            Self::Subtract => Some("return arg1 - arg2;"),
            Self::Multiply => Some("return arg1 * arg2;"),
            Self::Divide => Some("return arg1 / arg2;"),
            _ => None,
        }
    }

    /// Declared type of the output slot
    pub fn output_type(self) -> SlotValueType {
        match self {
            Self::Length | Self::Dot => SlotValueType::Vector1,
            _ => SlotValueType::Dynamic,
        }
    }

    /// Display name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Abs => "Abs",
            Self::Sin => "Sin",
            Self::Cos => "Cos",
            Self::Frac => "Fraction",
            Self::Saturate => "Saturate",
            Self::Normalize => "Normalize",
            Self::Sqrt => "Square Root",
            Self::Length => "Length",
            Self::OneMinus => "One Minus",
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Pow => "Power",
            Self::Min => "Minimum",
            Self::Max => "Maximum",
            Self::Step => "Step",
            Self::Dot => "Dot Product",
            Self::Reflect => "Reflect",
            Self::Lerp => "Lerp",
            Self::Clamp => "Clamp",
            Self::Smoothstep => "Smoothstep",
        }
    }

    /// Identifier prefix for emitted variables
    pub fn slug(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Frac => "frac",
            Self::Saturate => "saturate",
            Self::Normalize => "normalize",
            Self::Sqrt => "sqrt",
            Self::Length => "length",
            Self::OneMinus => "oneminus",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
            Self::Step => "step",
            Self::Dot => "dot",
            Self::Reflect => "reflect",
            Self::Lerp => "lerp",
            Self::Clamp => "clamp",
            Self::Smoothstep => "smoothstep",
        }
    }
}

/// Node applying a [`MathFunction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    /// Function to apply
    pub function: MathFunction,
}

impl FunctionNode {
    /// Create a function node
    pub fn new(function: MathFunction) -> Self {
        Self { function }
    }

    pub(crate) fn slot_descriptors(&self) -> Vec<SlotDescriptor> {
        let mut slots: Vec<SlotDescriptor> = INPUT_SLOTS
            .iter()
            .take(self.function.arity())
            .map(|name| SlotDescriptor::input(*name, SlotValueType::Dynamic))
            .collect();
        slots.push(SlotDescriptor::output(OUTPUT_SLOT, self.function.output_type()));
        slots
    }

    /// Resolve the designated slots, inputs first
    fn designated_slots<'a>(&self, ctx: &NodeContext<'a>) -> Result<(Vec<&'a Slot>, &'a Slot), NodeError> {
        let inputs = INPUT_SLOTS
            .iter()
            .take(self.function.arity())
            .map(|name| ctx.require_input(name))
            .collect::<Result<Vec<_>, _>>()?;
        let output = ctx.require_output(OUTPUT_SLOT)?;
        Ok((inputs, output))
    }

    /// `inline half4 unity_add(half4 arg1, half2 arg2)`
    fn prototype(&self, ctx: &NodeContext<'_>, inputs: &[&Slot], output: &Slot) -> String {
        let args: Vec<String> = inputs
            .iter()
            .enumerate()
            .map(|(i, slot)| format!("{} arg{}", ctx.type_name(slot), i + 1))
            .collect();
        format!(
            "inline {} {}({})",
            ctx.type_name(output),
            self.function.function_name(),
            args.join(", ")
        )
    }
}

impl NodeCodegen for FunctionNode {
    fn generate_body(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) -> Result<(), NodeError> {
        let (inputs, output) = self.designated_slots(ctx)?;

        let args: Vec<String> = inputs
            .iter()
            .zip(self.function.defaults())
            .map(|(slot, default)| ctx.input_value(slot, &[*default]))
            .collect();

        sink.add_line(
            ShaderSection::Body,
            format!(
                "{} {} = {}({});",
                ctx.type_name(output),
                self.output_variable(ctx, output),
                self.function.function_name(),
                args.join(", ")
            ),
        );
        Ok(())
    }

    fn generate_functions(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        let Some(body) = self.function.definition_body() else {
            return;
        };
        let Ok((inputs, output)) = self.designated_slots(ctx) else {
            return;
        };

        let definition = format!("{}\n{{\n\t{}\n}}", self.prototype(ctx, &inputs, output), body);
        sink.add_chunk(ShaderSection::Functions, definition, true);
    }
}
