//! Native ABI layout: (size, alignment) of every node, following the
//! platform C compiler's struct and union packing rules.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::{GenError, Result};
use crate::exceptions;
use crate::metadata::NativeType;
use crate::registry::TypeRegistry;
use crate::types::{Composite, Kind, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SizeInfo {
    pub size: usize,
    pub align: usize,
}

impl SizeInfo {
    pub const fn new(size: usize, align: usize) -> Self {
        Self { size, align }
    }
}

/// Offsets of a struct's fields plus its overall layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    pub offsets: Vec<usize>,
    pub info: SizeInfo,
}

/// Width table for native scalars. `None` for kinds without a size.
pub fn native_layout(ty: NativeType, pointer_width: usize) -> Option<SizeInfo> {
    let (size, align) = match ty {
        NativeType::SByte | NativeType::Byte | NativeType::Boolean => (1, 1),
        NativeType::Int16 | NativeType::UInt16 | NativeType::Char => (2, 2),
        NativeType::Int32 | NativeType::UInt32 | NativeType::Single => (4, 4),
        NativeType::Int64 | NativeType::UInt64 | NativeType::Double => (8, 8),
        NativeType::IntPtr | NativeType::UIntPtr | NativeType::String => {
            (pointer_width, pointer_width)
        }
        // 16 bytes, but only 4-byte aligned: {u32, u16, u16, [u8; 8]}.
        NativeType::Guid => (16, 4),
        NativeType::Void | NativeType::Unsupported => return None,
    };
    Some(SizeInfo::new(size, align))
}

fn align_up(offset: usize, align: usize) -> usize {
    if align == 0 {
        offset
    } else {
        offset.div_ceil(align) * align
    }
}

/// Lazily computes and caches layouts for one target pointer width.
///
/// Not `Sync`: every namespace worker owns its own engine over the shared
/// registry.
pub struct LayoutEngine<'r> {
    registry: &'r TypeRegistry,
    pointer_width: usize,
    cache: RefCell<HashMap<NodeId, SizeInfo>>,
    in_progress: RefCell<HashSet<NodeId>>,
}

impl<'r> LayoutEngine<'r> {
    pub fn new(registry: &'r TypeRegistry, pointer_width: usize) -> Self {
        Self {
            registry,
            pointer_width,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    pub fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    fn pointer(&self) -> SizeInfo {
        SizeInfo::new(self.pointer_width, self.pointer_width)
    }

    pub fn size_of(&self, id: NodeId) -> Result<SizeInfo> {
        if let Some(info) = self.cache.borrow().get(&id) {
            return Ok(*info);
        }
        if !self.in_progress.borrow_mut().insert(id) {
            return Err(GenError::Cycle {
                action: "laying out",
                name: self.registry.display_name(id),
            });
        }
        let result = self.compute(id);
        self.in_progress.borrow_mut().remove(&id);

        let info = result?;
        self.cache.borrow_mut().insert(id, info);
        Ok(info)
    }

    /// Field offsets of a struct node.
    pub fn struct_layout(&self, id: NodeId) -> Result<StructLayout> {
        match &self.registry.node(id).kind {
            Kind::Struct(c) => self.sequential(id, c),
            other => Err(self.layout_error(id, format!("{} has no field offsets", other.describe()))),
        }
    }

    fn compute(&self, id: NodeId) -> Result<SizeInfo> {
        let node = self.registry.node(id);
        match &node.kind {
            Kind::Native(ty) => native_layout(*ty, self.pointer_width)
                .ok_or_else(|| self.layout_error(id, format!("native `{ty:?}` has no size"))),
            Kind::Pointer(_) | Kind::FunctionPointer(_) | Kind::ComInterface(_) => {
                Ok(self.pointer())
            }
            Kind::Array { element, count } => {
                let elem = self.size_of(*element)?;
                Ok(SizeInfo::new(elem.size * (*count).max(1), elem.align))
            }
            Kind::Reference(symbol) => {
                if exceptions::is_pointer_like_word(&symbol.name) {
                    return Ok(self.pointer());
                }
                match self.registry.resolve(id) {
                    Some(target) => self.size_of(target),
                    None => exceptions::opaque_layout(&symbol.name)
                        .ok_or_else(|| self.registry.unresolved(id)),
                }
            }
            Kind::Alias(def) => self.size_of(*def),
            Kind::Enum(e) => native_layout(e.base, self.pointer_width)
                .ok_or_else(|| self.layout_error(id, format!("enum base `{:?}`", e.base))),
            Kind::Struct(c) => Ok(self.sequential(id, c)?.info),
            Kind::Union(c) => self.overlapping(id, c),
            Kind::Void | Kind::ComClassId(_) => Err(self.layout_error(
                id,
                format!("{} has no layout", node.kind.describe()),
            )),
            Kind::Unsupported => Err(GenError::UnsupportedKind {
                kind: node.kind.describe().to_string(),
                context: self.registry.site(id),
            }),
        }
    }

    fn member(&self, ty: NodeId, packing: Option<usize>) -> Result<SizeInfo> {
        let mut info = self.size_of(ty)?;
        if let Some(pack) = packing {
            info.align = info.align.min(pack);
        }
        Ok(info)
    }

    fn sequential(&self, id: NodeId, c: &Composite) -> Result<StructLayout> {
        let mut offsets = Vec::with_capacity(c.fields.len());
        let mut offset = 0;
        let mut align = 0;
        for field in &c.fields {
            let info = self.member(field.ty, c.packing)?;
            if info.align == 0 && info.size != 0 {
                return Err(self.layout_error(
                    id,
                    format!("field `{}` has size {} but no alignment", field.name, info.size),
                ));
            }
            offset = align_up(offset, info.align);
            offsets.push(offset);
            offset += info.size;
            align = align.max(info.align);
        }
        Ok(StructLayout {
            offsets,
            info: SizeInfo::new(align_up(offset, align), align),
        })
    }

    fn overlapping(&self, id: NodeId, c: &Composite) -> Result<SizeInfo> {
        let mut size = 0;
        let mut align = 0;
        for field in &c.fields {
            let mut info = self.member(field.ty, c.packing)?;
            if info.align == 0 {
                if info.size > self.pointer_width {
                    return Err(self.layout_error(
                        id,
                        format!(
                            "member `{}` has size {} and no alignment to infer",
                            field.name, info.size
                        ),
                    ));
                }
                info.align = info.size;
            }
            size = size.max(info.size);
            align = align.max(info.align);
        }
        Ok(SizeInfo::new(align_up(size, align), align))
    }

    fn layout_error(&self, id: NodeId, reason: String) -> GenError {
        GenError::Layout {
            name: self.registry.display_name(id),
            reason,
        }
    }
}
