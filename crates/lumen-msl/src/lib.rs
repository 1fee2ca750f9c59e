#![warn(missing_docs)]
//! Binding options for the Metal Shading Language backend.
//!
//! WGSL resources are addressed by `(group, binding)`; MSL addresses them by a
//! flat slot per resource class (`[[buffer(n)]]`, `[[texture(n)]]`,
//! `[[sampler(n)]]`). The caller describes the mapping in [`Options`]; this
//! crate checks it for conflicts ([`validate_binding_options`]) and turns it
//! into the tables the binding remapper and the multiplanar external texture
//! transform consume ([`populate_remapper_and_multiplanar_options`]).

use std::collections::BTreeMap;
use std::fmt;

use lumen_ir::{BindingPoint, Handle, Type, TypeInterner};

mod remap;
mod validate;

pub use remap::{
    ExternalTextureBindingPoints, ExternalTextureOptions, RemapperData,
    populate_remapper_and_multiplanar_options,
};
pub use validate::validate_binding_options;

/// Destination slot of one resource in the MSL output.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BindingInfo {
    /// The MSL slot index.
    pub binding: u32,
}

impl BindingInfo {
    /// Creates a binding at slot `binding`.
    pub const fn new(binding: u32) -> Self {
        Self { binding }
    }
}

/// MSL slots of the three resources an external texture expands into.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExternalTexture {
    /// First plane, a `[[texture()]]`.
    pub plane0: BindingInfo,
    /// Second plane, a `[[texture()]]`.
    pub plane1: BindingInfo,
    /// Conversion parameters, a `[[buffer()]]`.
    pub metadata: BindingInfo,
}

/// WGSL-to-MSL binding tables, one per resource kind.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    /// Uniform buffers.
    pub uniform: BTreeMap<BindingPoint, BindingInfo>,
    /// Storage buffers.
    pub storage: BTreeMap<BindingPoint, BindingInfo>,
    /// Sampled, depth and multisampled textures.
    pub texture: BTreeMap<BindingPoint, BindingInfo>,
    /// Storage textures.
    pub storage_texture: BTreeMap<BindingPoint, BindingInfo>,
    /// Samplers.
    pub sampler: BTreeMap<BindingPoint, BindingInfo>,
    /// External textures.
    pub external_texture: BTreeMap<BindingPoint, ExternalTexture>,
}

impl Bindings {
    /// Looks up the MSL slot of `point` among the tables of `class`.
    ///
    /// External textures answer texture lookups with their plane0 slot.
    pub fn lookup(&self, point: BindingPoint, class: ResourceClass) -> Option<BindingInfo> {
        let tables: &[&BTreeMap<BindingPoint, BindingInfo>] = match class {
            ResourceClass::Buffer => &[&self.uniform, &self.storage],
            ResourceClass::Texture => &[&self.texture, &self.storage_texture],
            ResourceClass::Sampler => &[&self.sampler],
        };
        tables
            .iter()
            .find_map(|table| table.get(&point).copied())
            .or_else(|| match class {
                ResourceClass::Texture => self.external_texture.get(&point).map(|e| e.plane0),
                _ => None,
            })
    }
}

/// Options for the MSL backend.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Resource binding tables.
    pub bindings: Bindings,
}

/// The MSL argument table a resource lives in.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ResourceClass {
    /// `[[buffer(n)]]`
    Buffer,
    /// `[[texture(n)]]`
    Texture,
    /// `[[sampler(n)]]`
    Sampler,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buffer => "buffer",
            Self::Texture => "texture",
            Self::Sampler => "sampler",
        })
    }
}

/// Classifies the store type of a resource variable.
///
/// Pointer, reference and alias layers are looked through. Returns `None` for
/// `void`, which cannot be bound.
pub fn resource_class(types: &TypeInterner, ty: Handle<Type>) -> Option<ResourceClass> {
    let ty = &types[types.unwrap_all(ty)];
    match ty {
        Type::Void => None,
        Type::Sampler(_) => Some(ResourceClass::Sampler),
        _ if ty.is_texture() => Some(ResourceClass::Texture),
        _ => Some(ResourceClass::Buffer),
    }
}

/// Severity level for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// The options are unusable.
    Error,
    /// Context attached to a preceding error.
    Note,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "Error",
            Self::Note => "Note",
        })
    }
}

/// A diagnostic message produced while processing options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub level: DiagnosticLevel,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
        }
    }

    pub(crate) fn note(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Note,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Errors from binding option validation.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The binding tables contain conflicting entries.
    #[error("invalid binding options: {}", first_error(.0))]
    Invalid(Vec<Diagnostic>),
}

impl BindingError {
    /// Returns every diagnostic collected before validation stopped.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Invalid(diagnostics) => diagnostics,
        }
    }
}

fn first_error(diagnostics: &[Diagnostic]) -> &str {
    diagnostics
        .iter()
        .find(|d| d.level == DiagnosticLevel::Error)
        .map_or("unknown conflict", |d| d.message.as_str())
}

#[cfg(test)]
mod tests {
    use lumen_ir::{Access, AddressSpace, SamplerKind, TexelFormat, TextureDimension};

    use super::*;

    #[test]
    fn classify_resources() {
        let mut types = TypeInterner::new();
        let f32_ty = types.f32();
        let params = types.structure("Params", vec![f32_ty]);
        let uniform = types.pointer(params, AddressSpace::Uniform, Access::READ);
        let sampler = types.sampler(SamplerKind::Comparison);
        let aliased = types.alias("shadow_sampler", sampler);
        let storage = types.storage_texture(
            TextureDimension::D2,
            TexelFormat::Rgba8Unorm,
            Access::WRITE,
        );
        let storage_ref = types.reference(storage, AddressSpace::Handle, Access::UNDEFINED);
        let void = types.void();

        assert_eq!(resource_class(&types, uniform), Some(ResourceClass::Buffer));
        assert_eq!(resource_class(&types, aliased), Some(ResourceClass::Sampler));
        assert_eq!(resource_class(&types, storage_ref), Some(ResourceClass::Texture));
        assert_eq!(resource_class(&types, void), None);
    }

    #[test]
    fn lookup_by_class() {
        let mut bindings = Bindings::default();
        let point = BindingPoint::new(1, 2);
        bindings.storage.insert(point, BindingInfo::new(5));
        bindings.external_texture.insert(
            BindingPoint::new(2, 0),
            ExternalTexture {
                plane0: BindingInfo::new(3),
                plane1: BindingInfo::new(4),
                metadata: BindingInfo::new(6),
            },
        );

        assert_eq!(
            bindings.lookup(point, ResourceClass::Buffer),
            Some(BindingInfo::new(5))
        );
        assert_eq!(bindings.lookup(point, ResourceClass::Texture), None);
        assert_eq!(
            bindings.lookup(BindingPoint::new(2, 0), ResourceClass::Texture),
            Some(BindingInfo::new(3))
        );
    }

    #[test]
    fn display_diagnostic() {
        let error = Diagnostic::error("found duplicate MSL binding point: [binding: 1]");
        assert_eq!(
            error.to_string(),
            "[Error] found duplicate MSL binding point: [binding: 1]"
        );
        let err = BindingError::Invalid(vec![error, Diagnostic::note("when processing uniform")]);
        assert_eq!(
            err.to_string(),
            "invalid binding options: found duplicate MSL binding point: [binding: 1]"
        );
        assert_eq!(err.diagnostics().len(), 2);
    }
}
