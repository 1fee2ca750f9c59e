//! Conflict detection for binding tables.

use std::collections::BTreeMap;

use lumen_ir::BindingPoint;

use crate::{BindingError, BindingInfo, Diagnostic, Options};

/// Seen MSL slots of one resource class, keyed by slot.
type SlotMap = BTreeMap<BindingInfo, BindingPoint>;

/// Tracks every mapping seen so far, across all tables.
///
/// Repeating an identical `(source, destination)` pair is accepted, since
/// several entry points may share one remapper.
#[derive(Default)]
struct Seen {
    wgsl: BTreeMap<BindingPoint, BindingInfo>,
    buffer: SlotMap,
    texture: SlotMap,
    sampler: SlotMap,
    diagnostics: Vec<Diagnostic>,
}

impl Seen {
    /// Records `src -> dst`; returns `false` on a conflicting WGSL point.
    fn wgsl(&mut self, src: BindingPoint, dst: BindingInfo) -> bool {
        match self.wgsl.get(&src) {
            Some(existing) if *existing != dst => {
                self.diagnostics.push(Diagnostic::error(format!(
                    "found duplicate WGSL binding point: {src}"
                )));
                false
            }
            _ => {
                self.wgsl.insert(src, dst);
                true
            }
        }
    }

    /// Records `slot <- src` in `map`; returns `false` on a conflicting slot.
    fn msl(
        diagnostics: &mut Vec<Diagnostic>,
        map: &mut SlotMap,
        slot: BindingInfo,
        src: BindingPoint,
    ) -> bool {
        match map.get(&slot) {
            Some(existing) if *existing != src => {
                diagnostics.push(Diagnostic::error(format!(
                    "found duplicate MSL binding point: [binding: {}]",
                    slot.binding
                )));
                false
            }
            _ => {
                map.insert(slot, src);
                true
            }
        }
    }

    fn table(&mut self, class: Class, table: &BTreeMap<BindingPoint, BindingInfo>) -> bool {
        for (&src, &dst) in table {
            if !self.wgsl(src, dst) {
                return false;
            }
            let map = match class {
                Class::Buffer => &mut self.buffer,
                Class::Texture => &mut self.texture,
                Class::Sampler => &mut self.sampler,
            };
            if !Self::msl(&mut self.diagnostics, map, dst, src) {
                return false;
            }
        }
        true
    }

    fn fail(mut self, kind: &str) -> BindingError {
        log::warn!("rejected MSL binding options while processing {kind}");
        self.diagnostics
            .push(Diagnostic::note(format!("when processing {kind}")));
        BindingError::Invalid(self.diagnostics)
    }
}

#[derive(Clone, Copy)]
enum Class {
    Buffer,
    Texture,
    Sampler,
}

/// Checks the binding tables of `options` for conflicts.
///
/// A WGSL binding point may map to only one MSL slot, and within one MSL
/// argument table (buffers, textures, samplers) a slot may be claimed by only
/// one WGSL binding point. Uniform and storage buffers share the buffer table;
/// textures, storage textures and both external texture planes share the
/// texture table; external texture metadata lands in the buffer table.
///
/// Validation stops at the first conflict. The returned error carries the
/// conflict and a note naming the table being processed.
pub fn validate_binding_options(options: &Options) -> Result<(), BindingError> {
    let bindings = &options.bindings;
    let mut seen = Seen::default();

    let tables = [
        ("uniform", Class::Buffer, &bindings.uniform),
        ("storage", Class::Buffer, &bindings.storage),
        ("sampler", Class::Sampler, &bindings.sampler),
        ("texture", Class::Texture, &bindings.texture),
        ("storage_texture", Class::Texture, &bindings.storage_texture),
    ];
    for (kind, class, table) in tables {
        if !seen.table(class, table) {
            return Err(seen.fail(kind));
        }
    }

    for (&src, external) in &bindings.external_texture {
        // The source point is checked against plane0, where the remapper puts it.
        let ok = seen.wgsl(src, external.plane0)
            && Seen::msl(&mut seen.diagnostics, &mut seen.texture, external.plane0, src)
            && Seen::msl(&mut seen.diagnostics, &mut seen.texture, external.plane1, src)
            && Seen::msl(&mut seen.diagnostics, &mut seen.buffer, external.metadata, src);
        if !ok {
            return Err(seen.fail("external_texture"));
        }
    }

    log::debug!(
        "validated {} WGSL binding point(s) for MSL",
        seen.wgsl.len()
    );
    Ok(())
}
