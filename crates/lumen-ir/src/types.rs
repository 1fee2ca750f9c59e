//! Type descriptors for the Lumen IR.
//!
//! A [`Type`] is a structural descriptor whose components are handles to
//! other interned types, so two descriptors compare equal exactly when their
//! variants, plain fields and component identities match. Canonical handles
//! are handed out by [`TypeInterner`](crate::TypeInterner).

use crate::access::{Access, AddressSpace};
use crate::arena::Handle;

/// Number of components in a vector, or columns/rows in a matrix.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum VectorSize {
    /// 2 components.
    Bi = 2,
    /// 3 components.
    Tri = 3,
    /// 4 components.
    Quad = 4,
}

/// Size of an array.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ArraySize {
    /// Fixed-size array.
    Constant(u32),
    /// Runtime-sized array.
    Dynamic,
}

/// Sampler flavour.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum SamplerKind {
    Sampler,
    Comparison,
}

/// Dimensionality of a texture.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TextureDimension {
    D1,
    D2,
    D2Array,
    D3,
    Cube,
    CubeArray,
}

/// Texel format of a storage texture.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TexelFormat {
    Bgra8Unorm,
    Rgba8Unorm,
    Rgba8Snorm,
    Rgba8Uint,
    Rgba8Sint,
    Rgba16Uint,
    Rgba16Sint,
    Rgba16Float,
    R32Uint,
    R32Sint,
    R32Float,
    Rg32Uint,
    Rg32Sint,
    Rg32Float,
    Rgba32Uint,
    Rgba32Sint,
    Rgba32Float,
}

/// The structural descriptor of an IR type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Type {
    Void,
    Bool,
    I32,
    U32,
    F32,
    /// A pointer to a value in a given address space.
    Pointer {
        store: Handle<Type>,
        space: AddressSpace,
        access: Access,
    },
    /// A reference to a memory location, the type of a variable identifier.
    Reference {
        store: Handle<Type>,
        space: AddressSpace,
        access: Access,
    },
    /// A vector of scalars.
    Vector {
        element: Handle<Type>,
        size: VectorSize,
    },
    /// A matrix of column vectors.
    Matrix {
        element: Handle<Type>,
        columns: VectorSize,
        rows: VectorSize,
    },
    /// A fixed-size or runtime-sized array. A zero stride means implicit.
    Array {
        element: Handle<Type>,
        size: ArraySize,
        stride: u32,
    },
    Sampler(SamplerKind),
    DepthTexture(TextureDimension),
    DepthMultisampledTexture(TextureDimension),
    MultisampledTexture {
        dim: TextureDimension,
        sampled: Handle<Type>,
    },
    SampledTexture {
        dim: TextureDimension,
        sampled: Handle<Type>,
    },
    StorageTexture {
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    },
    /// A named alias of another type.
    Alias { name: String, base: Handle<Type> },
    /// A named structure.
    Struct {
        name: String,
        members: Vec<Handle<Type>>,
    },
}

impl Type {
    /// Returns the handles of every type this descriptor refers to.
    pub fn components(&self) -> Vec<Handle<Type>> {
        match self {
            Self::Void
            | Self::Bool
            | Self::I32
            | Self::U32
            | Self::F32
            | Self::Sampler(_)
            | Self::DepthTexture(_)
            | Self::DepthMultisampledTexture(_)
            | Self::StorageTexture { .. } => Vec::new(),
            Self::Pointer { store, .. } | Self::Reference { store, .. } => vec![*store],
            Self::Vector { element, .. }
            | Self::Matrix { element, .. }
            | Self::Array { element, .. } => vec![*element],
            Self::MultisampledTexture { sampled, .. } | Self::SampledTexture { sampled, .. } => {
                vec![*sampled]
            }
            Self::Alias { base, .. } => vec![*base],
            Self::Struct { members, .. } => members.clone(),
        }
    }

    /// Returns `true` for the scalar variants.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool | Self::I32 | Self::U32 | Self::F32)
    }

    /// Returns `true` for any texture variant.
    pub fn is_texture(&self) -> bool {
        matches!(
            self,
            Self::DepthTexture(_)
                | Self::DepthMultisampledTexture(_)
                | Self::MultisampledTexture { .. }
                | Self::SampledTexture { .. }
                | Self::StorageTexture { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_of_leaf_types_are_empty() {
        assert!(Type::F32.components().is_empty());
        assert!(Type::Sampler(SamplerKind::Comparison).components().is_empty());
        assert!(
            Type::StorageTexture {
                dim: TextureDimension::D2,
                format: TexelFormat::Rgba8Unorm,
                access: Access::WRITE,
            }
            .components()
            .is_empty()
        );
    }

    #[test]
    fn vector_size_values() {
        assert_eq!(VectorSize::Bi as u32, 2);
        assert_eq!(VectorSize::Tri as u32, 3);
        assert_eq!(VectorSize::Quad as u32, 4);
    }

    #[test]
    fn structurally_equal_descriptors_compare_equal() {
        let a = Type::Alias {
            name: "Index".into(),
            base: Handle::new(2, 0),
        };
        let b = Type::Alias {
            name: "Index".into(),
            base: Handle::new(2, 0),
        };
        let c = Type::Alias {
            name: "Index".into(),
            base: Handle::new(3, 0),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn texture_classification() {
        assert!(Type::DepthTexture(TextureDimension::Cube).is_texture());
        assert!(!Type::Sampler(SamplerKind::Sampler).is_texture());
        assert!(Type::Bool.is_scalar());
        assert!(!Type::Void.is_scalar());
    }
}
