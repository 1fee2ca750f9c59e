//! Address spaces, access modes, and resource binding points.

/// Bitflags for pointer and storage-texture access modes.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Access(u32);

impl Access {
    /// No declared access.
    pub const UNDEFINED: Self = Self(0);
    /// Read access.
    pub const READ: Self = Self(1);
    /// Write access.
    pub const WRITE: Self = Self(2);
    /// Read and write access.
    pub const READ_WRITE: Self = Self(3);

    /// Returns `true` if `self` contains all flags in `other`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flags are set.
    pub fn is_undefined(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Access {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Access {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Memory address space of a pointer or reference.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum AddressSpace {
    /// Function-local storage.
    Function,
    /// Module-scope private storage.
    Private,
    /// Workgroup shared storage.
    Workgroup,
    /// Uniform buffer.
    Uniform,
    /// Storage buffer.
    Storage,
    /// Opaque handles (textures, samplers).
    Handle,
    /// Push constant block.
    PushConstant,
}

/// `@group(N) @binding(N)` resource binding.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BindingPoint {
    pub group: u32,
    pub binding: u32,
}

impl BindingPoint {
    pub const fn new(group: u32, binding: u32) -> Self {
        Self { group, binding }
    }
}
