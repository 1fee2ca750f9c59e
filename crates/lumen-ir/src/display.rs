//! Display implementations and text dump for debugging.

use std::fmt::{self, Write as _};

use crate::Module;
use crate::access::{Access, AddressSpace, BindingPoint};
use crate::arena::Handle;
use crate::instruction::{BinaryKind, CaseSelector, Instruction, UnaryKind};
use crate::interner::TypeInterner;
use crate::types::{ArraySize, SamplerKind, TexelFormat, TextureDimension, Type, VectorSize};
use crate::value::{Literal, RuntimeId, Value, ValueKind};

impl fmt::Display for VectorSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u32)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let read = self.contains(Access::READ);
        let write = self.contains(Access::WRITE);
        match (read, write) {
            (true, true) => write!(f, "read_write"),
            (true, false) => write!(f, "read"),
            (false, true) => write!(f, "write"),
            (false, false) => write!(f, "undefined"),
        }
    }
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Private => write!(f, "private"),
            Self::Workgroup => write!(f, "workgroup"),
            Self::Uniform => write!(f, "uniform"),
            Self::Storage => write!(f, "storage"),
            Self::Handle => write!(f, "handle"),
            Self::PushConstant => write!(f, "push_constant"),
        }
    }
}

impl fmt::Display for BindingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[group: {}, binding: {}]", self.group, self.binding)
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sampler => write!(f, "sampler"),
            Self::Comparison => write!(f, "sampler_comparison"),
        }
    }
}

impl fmt::Display for TextureDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D1 => write!(f, "1d"),
            Self::D2 => write!(f, "2d"),
            Self::D2Array => write!(f, "2d_array"),
            Self::D3 => write!(f, "3d"),
            Self::Cube => write!(f, "cube"),
            Self::CubeArray => write!(f, "cube_array"),
        }
    }
}

impl fmt::Display for TexelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bgra8Unorm => "bgra8unorm",
            Self::Rgba8Unorm => "rgba8unorm",
            Self::Rgba8Snorm => "rgba8snorm",
            Self::Rgba8Uint => "rgba8uint",
            Self::Rgba8Sint => "rgba8sint",
            Self::Rgba16Uint => "rgba16uint",
            Self::Rgba16Sint => "rgba16sint",
            Self::Rgba16Float => "rgba16float",
            Self::R32Uint => "r32uint",
            Self::R32Sint => "r32sint",
            Self::R32Float => "r32float",
            Self::Rg32Uint => "rg32uint",
            Self::Rg32Sint => "rg32sint",
            Self::Rg32Float => "rg32float",
            Self::Rgba32Uint => "rgba32uint",
            Self::Rgba32Sint => "rgba32sint",
            Self::Rgba32Float => "rgba32float",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for CaseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// Formats a type in WGSL surface syntax, resolving components through `types`.
pub fn format_type(handle: Handle<Type>, types: &TypeInterner) -> String {
    match &types[handle] {
        Type::Void => "void".into(),
        Type::Bool => "bool".into(),
        Type::I32 => "i32".into(),
        Type::U32 => "u32".into(),
        Type::F32 => "f32".into(),
        Type::Pointer {
            store,
            space,
            access,
        } => format_memory("ptr", *store, *space, *access, types),
        Type::Reference {
            store,
            space,
            access,
        } => format_memory("ref", *store, *space, *access, types),
        Type::Vector { element, size } => format!("vec{size}<{}>", format_type(*element, types)),
        Type::Matrix {
            element,
            columns,
            rows,
        } => format!("mat{columns}x{rows}<{}>", format_type(*element, types)),
        Type::Array {
            element,
            size,
            stride,
        } => {
            let prefix = if *stride == 0 {
                String::new()
            } else {
                format!("@stride({stride}) ")
            };
            let element = format_type(*element, types);
            match size {
                ArraySize::Constant(n) => format!("{prefix}array<{element}, {n}>"),
                ArraySize::Dynamic => format!("{prefix}array<{element}>"),
            }
        }
        Type::Sampler(kind) => kind.to_string(),
        Type::DepthTexture(dim) => format!("texture_depth_{dim}"),
        Type::DepthMultisampledTexture(dim) => format!("texture_depth_multisampled_{dim}"),
        Type::MultisampledTexture { dim, sampled } => {
            format!("texture_multisampled_{dim}<{}>", format_type(*sampled, types))
        }
        Type::SampledTexture { dim, sampled } => {
            format!("texture_{dim}<{}>", format_type(*sampled, types))
        }
        Type::StorageTexture {
            dim,
            format,
            access,
        } => format!("texture_storage_{dim}<{format}, {access}>"),
        Type::Alias { name, .. } | Type::Struct { name, .. } => name.clone(),
    }
}

fn format_memory(
    keyword: &str,
    store: Handle<Type>,
    space: AddressSpace,
    access: Access,
    types: &TypeInterner,
) -> String {
    let store = format_type(store, types);
    if access.is_undefined() {
        format!("{keyword}<{space}, {store}>")
    } else {
        format!("{keyword}<{space}, {store}, {access}>")
    }
}

/// Formats a value as an operand: a constant renders its literal, anything
/// else its `%<id>`.
pub fn format_value(handle: Handle<Value>, module: &Module) -> String {
    match module.values.try_get(handle) {
        Some(value) => match &value.kind {
            ValueKind::Constant(lit) => lit.to_string(),
            ValueKind::Runtime(id) | ValueKind::BlockArgument { id, .. } => id.to_string(),
        },
        None => format!("<dead {handle:?}>"),
    }
}

fn format_result(result: Handle<Value>, module: &Module) -> String {
    let ty = format_type(module.values[result].ty, &module.types);
    format!("{} ({ty})", format_value(result, module))
}

/// Formats one instruction.
///
/// # Panics
///
/// Panics if `inst` is not a live instruction of `module`.
pub fn format_instruction(inst: Handle<Instruction>, module: &Module) -> String {
    match &module.instructions[inst] {
        Instruction::Binary(b) => format!(
            "{} = {} {} {}",
            format_result(b.result, module),
            format_value(b.lhs(), module),
            b.kind,
            format_value(b.rhs(), module),
        ),
        Instruction::Unary(u) => format!(
            "{} = {}{}",
            format_result(u.result, module),
            u.kind,
            format_value(u.val, module),
        ),
        Instruction::Switch(s) => {
            let cases: Vec<_> = s
                .cases
                .iter()
                .map(|case| {
                    let selectors: Vec<_> =
                        case.selectors.iter().map(ToString::to_string).collect();
                    format!("c: ({}, %b{})", selectors.join(" "), case.block.index())
                })
                .collect();
            format!(
                "switch {} [{}] # merge %b{}",
                format_value(s.condition, module),
                cases.join(", "),
                s.merge.index()
            )
        }
        Instruction::ExitSwitch(e) => {
            let merge = match module.instructions.try_get(e.switch) {
                Some(Instruction::Switch(s)) => format!("%b{}", s.merge.index()),
                _ => format!("<dead {:?}>", e.switch),
            };
            if e.args.is_empty() {
                format!("exit_switch {merge}")
            } else {
                let args: Vec<_> = e.args.iter().map(|&a| format_value(a, module)).collect();
                format!("exit_switch {merge} {}", args.join(", "))
            }
        }
    }
}

/// Produces a human-readable text dump of a [`Module`] for debugging.
pub fn dump_module(module: &Module) -> String {
    let mut out = String::new();

    out.push_str("Types:\n");
    for (handle, _) in module.types.iter() {
        let _ = writeln!(out, "  {handle:?} {}", format_type(handle, &module.types));
    }

    if module.blocks.iter().next().is_some() {
        out.push_str("\nBlocks:\n");
        for (handle, block) in module.blocks.iter() {
            let params: Vec<_> = block
                .params
                .iter()
                .map(|&p| format_result(p, module))
                .collect();
            if params.is_empty() {
                let _ = writeln!(out, "  %b{} {{", handle.index());
            } else {
                let _ = writeln!(out, "  %b{} ({}) {{", handle.index(), params.join(", "));
            }
            for &inst in &block.instructions {
                let _ = writeln!(out, "    {}", format_instruction(inst, module));
            }
            out.push_str("  }\n");
        }
    }

    let unplaced: Vec<_> = module
        .instructions
        .iter()
        .filter(|(handle, _)| module.block_of(*handle).is_none())
        .map(|(handle, _)| handle)
        .collect();
    if !unplaced.is_empty() {
        out.push_str("\nUnplaced:\n");
        for inst in unplaced {
            let _ = writeln!(out, "  {inst:?} {}", format_instruction(inst, module));
        }
    }

    out
}
