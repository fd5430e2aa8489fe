//! Argument classification over the object kind taxonomy.
//!
//! The predicates are pure functions of an [`ObjectTag`]; reading the tag from
//! the host is the only step that can fail.

use serde::Serialize;
use systf_objects::{ConstKind, ObjectKind};

use crate::host::{Handle, Host, HostFault};

/// Kind of an object plus, for constants and parameters, its literal subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectTag {
    kind: ObjectKind,
    const_kind: Option<ConstKind>,
}

impl ObjectTag {
    /// Returns `None` when a constant-like kind arrives without its subtype.
    /// A subtype on any other kind is dropped.
    pub fn new(kind: ObjectKind, const_kind: Option<ConstKind>) -> Option<Self> {
        if kind.has_const_kind() {
            let const_kind = const_kind?;
            Some(ObjectTag {
                kind,
                const_kind: Some(const_kind),
            })
        } else {
            Some(ObjectTag {
                kind,
                const_kind: None,
            })
        }
    }

    pub fn of<H: Host + ?Sized>(host: &H, handle: Handle) -> Result<Self, HostFault> {
        let kind = host.kind(handle);
        let const_kind = if kind.has_const_kind() {
            host.const_kind(handle)
        } else {
            None
        };
        ObjectTag::new(kind, const_kind).ok_or(HostFault::MissingConstKind { handle, kind })
    }

    pub fn kind(self) -> ObjectKind {
        self.kind
    }

    pub fn const_kind(self) -> Option<ConstKind> {
        self.const_kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgClass {
    ConstNumeric,
    ConstString,
    VarNumeric,
    VarString,
    Other,
}

pub fn is_constant(tag: ObjectTag) -> bool {
    matches!(tag.kind, ObjectKind::Constant | ObjectKind::Parameter)
}

pub fn is_numeric(tag: ObjectTag) -> bool {
    match tag.kind {
        ObjectKind::Constant | ObjectKind::Parameter => tag.const_kind != Some(ConstKind::String),
        ObjectKind::IntegerVar
        | ObjectKind::MemoryWord
        | ObjectKind::Net
        | ObjectKind::PartSelect
        | ObjectKind::RealVar
        | ObjectKind::Reg
        | ObjectKind::TimeVar => true,
        _ => false,
    }
}

/// Real variables hold a numeric value but have no string view.
pub fn is_string(tag: ObjectTag) -> bool {
    match tag.kind {
        ObjectKind::Constant | ObjectKind::Parameter => matches!(
            tag.const_kind,
            Some(ConstKind::String) | Some(ConstKind::Binary)
        ),
        ObjectKind::IntegerVar
        | ObjectKind::MemoryWord
        | ObjectKind::Net
        | ObjectKind::PartSelect
        | ObjectKind::Reg
        | ObjectKind::TimeVar => true,
        _ => false,
    }
}

pub fn classify(tag: ObjectTag) -> ArgClass {
    match (is_constant(tag), is_numeric(tag), is_string(tag)) {
        (true, true, _) => ArgClass::ConstNumeric,
        (true, false, true) => ArgClass::ConstString,
        (false, true, _) => ArgClass::VarNumeric,
        (false, false, true) => ArgClass::VarString,
        _ => ArgClass::Other,
    }
}
