//! Remapper and multiplanar external texture tables.

use std::collections::BTreeMap;

use lumen_ir::BindingPoint;

use crate::{BindingInfo, Options};

/// WGSL binding point to rebound `(0, slot)` binding point.
pub type RemapperData = BTreeMap<BindingPoint, BindingPoint>;

/// Rebound locations of the second plane and metadata of one external texture.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExternalTextureBindingPoints {
    /// Binding point of the second plane.
    pub plane1: BindingPoint,
    /// Binding point of the conversion parameters.
    pub metadata: BindingPoint,
}

/// Options for the multiplanar external texture transform.
#[derive(Clone, Debug, Default)]
pub struct ExternalTextureOptions {
    /// Keyed by the rebound plane0 binding point.
    pub bindings_map: BTreeMap<BindingPoint, ExternalTextureBindingPoints>,
}

fn rebound(info: BindingInfo) -> BindingPoint {
    BindingPoint::new(0, info.binding)
}

/// Builds the binding remapper table and the external texture table from
/// `options`.
///
/// Every resource is rebound to group 0 at its MSL slot. Entries already in
/// place (group 0, same slot) are left out of the remapper. External textures
/// are rebound to their plane0 slot, and the external texture table is keyed
/// by that rebound point since the remapper runs first.
///
/// Call [`validate_binding_options`](crate::validate_binding_options) first;
/// conflicting tables are not diagnosed here.
pub fn populate_remapper_and_multiplanar_options(
    options: &Options,
) -> (RemapperData, ExternalTextureOptions) {
    let bindings = &options.bindings;
    let mut remapper = RemapperData::new();
    let mut external = ExternalTextureOptions::default();

    let tables = [
        &bindings.uniform,
        &bindings.storage,
        &bindings.texture,
        &bindings.storage_texture,
        &bindings.sampler,
    ];
    for table in tables {
        for (&src, &dst) in table {
            if src.group == 0 && src.binding == dst.binding {
                continue;
            }
            remapper.entry(src).or_insert_with(|| rebound(dst));
        }
    }

    for (&src, texture) in &bindings.external_texture {
        let plane0 = rebound(texture.plane0);
        external.bindings_map.entry(plane0).or_insert(ExternalTextureBindingPoints {
            plane1: rebound(texture.plane1),
            metadata: rebound(texture.metadata),
        });
        if src == plane0 {
            continue;
        }
        remapper.entry(src).or_insert(plane0);
    }

    log::debug!(
        "remapping {} binding point(s), {} external texture(s)",
        remapper.len(),
        external.bindings_map.len()
    );
    (remapper, external)
}
