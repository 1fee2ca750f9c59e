//! Type interning and type classification queries.

use std::ops::Index;

use crate::access::{Access, AddressSpace};
use crate::arena::{Handle, UniqueArena};
use crate::types::{ArraySize, SamplerKind, TexelFormat, TextureDimension, Type, VectorSize};

/// Canonicalizes [`Type`] descriptors so that structurally equal types share
/// one [`Handle`].
///
/// Component types are always resolved through the same interner before the
/// composite is interned, so comparing handles is equivalent to comparing the
/// full type trees.
#[derive(Clone, Debug, Default)]
pub struct TypeInterner {
    types: UniqueArena<Type>,
}

impl TypeInterner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical handle for `ty`, creating it on first request.
    ///
    /// # Panics
    ///
    /// Panics if any component handle of `ty` was not issued by this interner.
    pub fn intern(&mut self, ty: Type) -> Handle<Type> {
        if let Some(handle) = self.types.get(&ty) {
            return handle;
        }
        for component in ty.components() {
            assert!(
                self.types.contains(component),
                "type component {component:?} is not owned by this interner"
            );
        }
        let handle = self.types.insert(ty);
        log::trace!("interned type {handle:?}: {:?}", self.types[handle]);
        handle
    }

    /// Returns the number of distinct types created so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `true` if `handle` was issued by this interner.
    pub fn contains(&self, handle: Handle<Type>) -> bool {
        self.types.contains(handle)
    }

    /// Returns the descriptor behind `handle` if it was issued by this interner.
    pub fn try_get(&self, handle: Handle<Type>) -> Option<&Type> {
        self.types.try_get(handle)
    }

    /// Iterates over `(handle, &type)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<Type>, &Type)> {
        self.types.iter()
    }

    /// Interns `void`.
    pub fn void(&mut self) -> Handle<Type> {
        self.intern(Type::Void)
    }

    /// Interns `bool`.
    pub fn bool(&mut self) -> Handle<Type> {
        self.intern(Type::Bool)
    }

    /// Interns `i32`.
    pub fn i32(&mut self) -> Handle<Type> {
        self.intern(Type::I32)
    }

    /// Interns `u32`.
    pub fn u32(&mut self) -> Handle<Type> {
        self.intern(Type::U32)
    }

    /// Interns `f32`.
    pub fn f32(&mut self) -> Handle<Type> {
        self.intern(Type::F32)
    }

    /// Interns `ptr<space, store, access>`.
    pub fn pointer(
        &mut self,
        store: Handle<Type>,
        space: AddressSpace,
        access: Access,
    ) -> Handle<Type> {
        self.intern(Type::Pointer {
            store,
            space,
            access,
        })
    }

    /// Interns `ref<space, store, access>`.
    pub fn reference(
        &mut self,
        store: Handle<Type>,
        space: AddressSpace,
        access: Access,
    ) -> Handle<Type> {
        self.intern(Type::Reference {
            store,
            space,
            access,
        })
    }

    /// Interns a vector of `size` elements.
    pub fn vector(&mut self, element: Handle<Type>, size: VectorSize) -> Handle<Type> {
        self.intern(Type::Vector { element, size })
    }

    /// Interns a `columns` x `rows` matrix.
    pub fn matrix(
        &mut self,
        element: Handle<Type>,
        columns: VectorSize,
        rows: VectorSize,
    ) -> Handle<Type> {
        self.intern(Type::Matrix {
            element,
            columns,
            rows,
        })
    }

    /// Interns an array type. A `size` of zero yields a runtime-sized array.
    pub fn array(&mut self, element: Handle<Type>, size: u32, stride: u32) -> Handle<Type> {
        let size = match size {
            0 => ArraySize::Dynamic,
            n => ArraySize::Constant(n),
        };
        self.intern(Type::Array {
            element,
            size,
            stride,
        })
    }

    /// Interns a sampler of the given kind.
    pub fn sampler(&mut self, kind: SamplerKind) -> Handle<Type> {
        self.intern(Type::Sampler(kind))
    }

    /// Interns a depth texture.
    pub fn depth_texture(&mut self, dim: TextureDimension) -> Handle<Type> {
        self.intern(Type::DepthTexture(dim))
    }

    /// Interns a multisampled depth texture.
    pub fn depth_multisampled_texture(&mut self, dim: TextureDimension) -> Handle<Type> {
        self.intern(Type::DepthMultisampledTexture(dim))
    }

    /// Interns a multisampled texture of `sampled` texels.
    pub fn multisampled_texture(
        &mut self,
        dim: TextureDimension,
        sampled: Handle<Type>,
    ) -> Handle<Type> {
        self.intern(Type::MultisampledTexture { dim, sampled })
    }

    /// Interns a sampled texture of `sampled` texels.
    pub fn sampled_texture(
        &mut self,
        dim: TextureDimension,
        sampled: Handle<Type>,
    ) -> Handle<Type> {
        self.intern(Type::SampledTexture { dim, sampled })
    }

    /// Interns a storage texture.
    pub fn storage_texture(
        &mut self,
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    ) -> Handle<Type> {
        self.intern(Type::StorageTexture {
            dim,
            format,
            access,
        })
    }

    /// Interns a named alias of `base`.
    pub fn alias(&mut self, name: impl Into<String>, base: Handle<Type>) -> Handle<Type> {
        self.intern(Type::Alias {
            name: name.into(),
            base,
        })
    }

    /// Interns a named structure with the given member types.
    pub fn structure(
        &mut self,
        name: impl Into<String>,
        members: Vec<Handle<Type>>,
    ) -> Handle<Type> {
        self.intern(Type::Struct {
            name: name.into(),
            members,
        })
    }

    /// Returns the unsigned integer scalar or vector equivalent of an integer
    /// scalar or vector, or `None` for every other type.
    pub fn as_unsigned(&mut self, ty: Handle<Type>) -> Option<Handle<Type>> {
        match self[ty] {
            Type::I32 | Type::U32 => Some(self.u32()),
            Type::Vector { element, size } => {
                let element = self.as_unsigned(element)?;
                Some(self.vector(element, size))
            }
            _ => None,
        }
    }

    /// Strips every pointer layer, returning the innermost store type.
    pub fn unwrap_pointer(&self, mut ty: Handle<Type>) -> Handle<Type> {
        while let Type::Pointer { store, .. } = self[ty] {
            ty = store;
        }
        ty
    }

    /// Strips every reference layer, returning the innermost store type.
    pub fn unwrap_reference(&self, mut ty: Handle<Type>) -> Handle<Type> {
        while let Type::Reference { store, .. } = self[ty] {
            ty = store;
        }
        ty
    }

    /// Strips every alias layer, returning the innermost aliased type.
    pub fn unwrap_alias(&self, mut ty: Handle<Type>) -> Handle<Type> {
        while let Type::Alias { base, .. } = self[ty] {
            ty = base;
        }
        ty
    }

    /// Removes all aliasing, references and pointers.
    pub fn unwrap_all(&self, mut ty: Handle<Type>) -> Handle<Type> {
        loop {
            let before = ty;
            ty = self.unwrap_alias(ty);
            ty = self.unwrap_reference(ty);
            ty = self.unwrap_pointer(ty);
            if ty == before {
                return ty;
            }
        }
    }

    fn vector_element(&self, ty: Handle<Type>) -> Option<&Type> {
        match self[ty] {
            Type::Vector { element, .. } => Some(&self[element]),
            _ => None,
        }
    }

    /// Returns `true` for `bool`, `i32`, `u32` and `f32`.
    pub fn is_scalar(&self, ty: Handle<Type>) -> bool {
        self[ty].is_scalar()
    }

    /// Returns `true` for `f32`.
    pub fn is_float_scalar(&self, ty: Handle<Type>) -> bool {
        matches!(self[ty], Type::F32)
    }

    /// Returns `true` for vectors of `f32`.
    pub fn is_float_vector(&self, ty: Handle<Type>) -> bool {
        matches!(self.vector_element(ty), Some(Type::F32))
    }

    /// Returns `true` for `f32` or a vector of it.
    pub fn is_float_scalar_or_vector(&self, ty: Handle<Type>) -> bool {
        self.is_float_scalar(ty) || self.is_float_vector(ty)
    }

    /// Returns `true` for `i32` and `u32`.
    pub fn is_integer_scalar(&self, ty: Handle<Type>) -> bool {
        matches!(self[ty], Type::I32 | Type::U32)
    }

    /// Returns `true` for an integer scalar or a vector of one.
    pub fn is_integer_scalar_or_vector(&self, ty: Handle<Type>) -> bool {
        self.is_unsigned_scalar_or_vector(ty) || self.is_signed_scalar_or_vector(ty)
    }

    /// Returns `true` for vectors of `i32`.
    pub fn is_signed_integer_vector(&self, ty: Handle<Type>) -> bool {
        matches!(self.vector_element(ty), Some(Type::I32))
    }

    /// Returns `true` for `i32` or a vector of it.
    pub fn is_signed_scalar_or_vector(&self, ty: Handle<Type>) -> bool {
        matches!(self[ty], Type::I32) || self.is_signed_integer_vector(ty)
    }

    /// Returns `true` for vectors of `u32`.
    pub fn is_unsigned_integer_vector(&self, ty: Handle<Type>) -> bool {
        matches!(self.vector_element(ty), Some(Type::U32))
    }

    /// Returns `true` for `u32` or a vector of it.
    pub fn is_unsigned_scalar_or_vector(&self, ty: Handle<Type>) -> bool {
        matches!(self[ty], Type::U32) || self.is_unsigned_integer_vector(ty)
    }
}

impl Index<Handle<Type>> for TypeInterner {
    type Output = Type;

    fn index(&self, handle: Handle<Type>) -> &Type {
        self.types
            .try_get(handle)
            .unwrap_or_else(|| panic!("type {handle:?} is not owned by this interner"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_interned_once() {
        let mut types = TypeInterner::new();
        let a = types.i32();
        let b = types.intern(Type::I32);
        assert_eq!(a, b);
        assert_ne!(a, types.u32());
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn equal_pointers_share_identity() {
        let mut types = TypeInterner::new();
        let i32_ty = types.i32();
        let p0 = types.pointer(i32_ty, AddressSpace::Private, Access::READ_WRITE);
        let p1 = types.pointer(i32_ty, AddressSpace::Private, Access::READ_WRITE);
        assert_eq!(p0, p1);
    }

    #[test]
    fn pointers_differing_in_one_field_are_distinct() {
        let mut types = TypeInterner::new();
        let i32_ty = types.i32();
        let f32_ty = types.f32();
        let base = types.pointer(i32_ty, AddressSpace::Private, Access::READ_WRITE);
        let other_store = types.pointer(f32_ty, AddressSpace::Private, Access::READ_WRITE);
        let other_space = types.pointer(i32_ty, AddressSpace::Function, Access::READ_WRITE);
        let other_access = types.pointer(i32_ty, AddressSpace::Private, Access::READ);
        assert_ne!(base, other_store);
        assert_ne!(base, other_space);
        assert_ne!(base, other_access);
        assert_ne!(other_store, other_space);
    }

    #[test]
    fn nested_composites_dedup() {
        let mut types = TypeInterner::new();
        let build = |types: &mut TypeInterner| {
            let f32_ty = types.f32();
            let v4 = types.vector(f32_ty, VectorSize::Quad);
            let arr = types.array(v4, 8, 16);
            types.structure("Particles", vec![arr, f32_ty])
        };
        let first = build(&mut types);
        let count = types.len();
        let second = build(&mut types);
        assert_eq!(first, second);
        assert_eq!(types.len(), count);
    }

    #[test]
    fn array_size_zero_is_runtime_sized() {
        let mut types = TypeInterner::new();
        let u32_ty = types.u32();
        let arr = types.array(u32_ty, 0, 4);
        assert!(matches!(
            types[arr],
            Type::Array {
                size: ArraySize::Dynamic,
                ..
            }
        ));
    }

    #[test]
    #[should_panic(expected = "not owned by this interner")]
    fn foreign_component_is_fatal() {
        let mut other = TypeInterner::new();
        let foreign = other.f32();

        let mut types = TypeInterner::new();
        let local = types.i32();
        assert_eq!(foreign.index(), local.index());
        assert!(!types.contains(foreign));
        types.vector(foreign, VectorSize::Bi);
    }

    #[test]
    fn composites_differing_in_one_field_are_distinct() {
        let mut types = TypeInterner::new();
        let f32_ty = types.f32();

        let mat2x4 = types.matrix(f32_ty, VectorSize::Bi, VectorSize::Quad);
        let mat4x2 = types.matrix(f32_ty, VectorSize::Quad, VectorSize::Bi);
        assert_ne!(mat2x4, mat4x2);

        let packed = types.array(f32_ty, 4, 4);
        let padded = types.array(f32_ty, 4, 16);
        let implicit = types.array(f32_ty, 4, 0);
        assert_ne!(packed, padded);
        assert_ne!(packed, implicit);

        let flat = types.sampled_texture(TextureDimension::D2, f32_ty);
        let layered = types.sampled_texture(TextureDimension::D2Array, f32_ty);
        let multisampled = types.multisampled_texture(TextureDimension::D2, f32_ty);
        assert_ne!(flat, layered);
        assert_ne!(flat, multisampled);

        let read = types.storage_texture(
            TextureDimension::D3,
            TexelFormat::Rgba8Unorm,
            Access::READ,
        );
        let write = types.storage_texture(
            TextureDimension::D3,
            TexelFormat::Rgba8Unorm,
            Access::WRITE,
        );
        let other_format = types.storage_texture(
            TextureDimension::D3,
            TexelFormat::Rgba8Snorm,
            Access::READ,
        );
        assert_ne!(read, write);
        assert_ne!(read, other_format);

        let vec2 = types.vector(f32_ty, VectorSize::Bi);
        let renamed_a = types.alias("A", vec2);
        let renamed_b = types.alias("B", vec2);
        assert_ne!(renamed_a, renamed_b);
        assert_eq!(renamed_a, types.alias("A", vec2));
    }

    #[test]
    fn unwrap_all_strips_every_layer() {
        let mut types = TypeInterner::new();
        let f32_ty = types.f32();
        let alias = types.alias("Scalar", f32_ty);
        let reference = types.reference(alias, AddressSpace::Function, Access::READ_WRITE);
        let pointer = types.pointer(reference, AddressSpace::Function, Access::READ_WRITE);
        let outer = types.alias("Handle", pointer);

        assert_eq!(types.unwrap_alias(outer), pointer);
        assert_eq!(types.unwrap_pointer(pointer), reference);
        assert_eq!(types.unwrap_reference(reference), alias);
        assert_eq!(types.unwrap_all(outer), f32_ty);
        assert_eq!(types.unwrap_all(types.unwrap_all(outer)), types.unwrap_all(outer));
        assert_eq!(types.unwrap_all(f32_ty), f32_ty);
    }

    #[test]
    fn scalar_and_vector_queries() {
        let mut types = TypeInterner::new();
        let f32_ty = types.f32();
        let i32_ty = types.i32();
        let u32_ty = types.u32();
        let bool_ty = types.bool();
        let vec3f = types.vector(f32_ty, VectorSize::Tri);
        let vec2i = types.vector(i32_ty, VectorSize::Bi);
        let vec4u = types.vector(u32_ty, VectorSize::Quad);

        assert!(types.is_float_scalar(f32_ty));
        assert!(!types.is_float_scalar(vec3f));
        assert!(types.is_float_vector(vec3f));
        assert!(types.is_float_scalar_or_vector(vec3f));
        assert!(!types.is_float_scalar_or_vector(i32_ty));

        assert!(types.is_integer_scalar(i32_ty));
        assert!(types.is_integer_scalar(u32_ty));
        assert!(!types.is_integer_scalar(bool_ty));
        assert!(types.is_integer_scalar_or_vector(vec2i));
        assert!(types.is_integer_scalar_or_vector(vec4u));
        assert!(!types.is_integer_scalar_or_vector(vec3f));

        assert!(types.is_signed_scalar_or_vector(i32_ty));
        assert!(types.is_signed_integer_vector(vec2i));
        assert!(!types.is_signed_scalar_or_vector(vec4u));
        assert!(types.is_unsigned_scalar_or_vector(u32_ty));
        assert!(types.is_unsigned_integer_vector(vec4u));
        assert!(!types.is_unsigned_integer_vector(vec2i));

        assert!(types.is_scalar(bool_ty));
        assert!(!types.is_scalar(vec2i));
    }

    #[test]
    fn queries_do_not_look_through_aliases() {
        let mut types = TypeInterner::new();
        let f32_ty = types.f32();
        let alias = types.alias("Real", f32_ty);
        assert!(!types.is_float_scalar(alias));
        assert!(types.is_float_scalar(types.unwrap_alias(alias)));
    }

    #[test]
    fn as_unsigned_maps_integers_only() {
        let mut types = TypeInterner::new();
        let i32_ty = types.i32();
        let u32_ty = types.u32();
        let f32_ty = types.f32();
        let vec3i = types.vector(i32_ty, VectorSize::Tri);
        let vec3u = types.vector(u32_ty, VectorSize::Tri);

        assert_eq!(types.as_unsigned(i32_ty), Some(u32_ty));
        assert_eq!(types.as_unsigned(u32_ty), Some(u32_ty));
        assert_eq!(types.as_unsigned(vec3i), Some(vec3u));
        assert_eq!(types.as_unsigned(f32_ty), None);
    }
}
