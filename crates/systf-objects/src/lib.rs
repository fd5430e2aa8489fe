//! Shared simulation-object taxonomy.
//!
//! This crate exists so both:
//! - the compile-time checkers
//! - hosts that translate raw VPI integer codes
//!
//! agree on one list of object kinds, constant kinds and standard signature shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind tag of a kernel-resident object, as reported for `vpiType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Constant,
    Parameter,
    IntegerVar,
    MemoryWord,
    Memory,
    Net,
    PartSelect,
    RealVar,
    Reg,
    TimeVar,
    Module,
    Task,
    Function,
    NamedBegin,
    NamedFork,
    SysTaskCall,
    SysFuncCall,
    Other,
}

impl ObjectKind {
    const ALL: [ObjectKind; 18] = [
        ObjectKind::Constant,
        ObjectKind::Parameter,
        ObjectKind::IntegerVar,
        ObjectKind::MemoryWord,
        ObjectKind::Memory,
        ObjectKind::Net,
        ObjectKind::PartSelect,
        ObjectKind::RealVar,
        ObjectKind::Reg,
        ObjectKind::TimeVar,
        ObjectKind::Module,
        ObjectKind::Task,
        ObjectKind::Function,
        ObjectKind::NamedBegin,
        ObjectKind::NamedFork,
        ObjectKind::SysTaskCall,
        ObjectKind::SysFuncCall,
        ObjectKind::Other,
    ];

    pub fn all() -> &'static [ObjectKind] {
        &Self::ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Constant => "constant",
            ObjectKind::Parameter => "parameter",
            ObjectKind::IntegerVar => "integer-var",
            ObjectKind::MemoryWord => "memory-word",
            ObjectKind::Memory => "memory",
            ObjectKind::Net => "net",
            ObjectKind::PartSelect => "part-select",
            ObjectKind::RealVar => "real-var",
            ObjectKind::Reg => "reg",
            ObjectKind::TimeVar => "time-var",
            ObjectKind::Module => "module",
            ObjectKind::Task => "task",
            ObjectKind::Function => "function",
            ObjectKind::NamedBegin => "named-begin",
            ObjectKind::NamedFork => "named-fork",
            ObjectKind::SysTaskCall => "sys-task-call",
            ObjectKind::SysFuncCall => "sys-func-call",
            ObjectKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Maps a raw `vpiType` value. Codes this taxonomy does not name become `Other`.
    pub fn from_vpi(code: i32) -> Self {
        match code {
            7 => ObjectKind::Constant,
            41 => ObjectKind::Parameter,
            25 => ObjectKind::IntegerVar,
            30 => ObjectKind::MemoryWord,
            29 => ObjectKind::Memory,
            36 => ObjectKind::Net,
            42 => ObjectKind::PartSelect,
            47 => ObjectKind::RealVar,
            48 => ObjectKind::Reg,
            63 => ObjectKind::TimeVar,
            32 => ObjectKind::Module,
            59 => ObjectKind::Task,
            20 => ObjectKind::Function,
            33 => ObjectKind::NamedBegin,
            34 => ObjectKind::NamedFork,
            57 => ObjectKind::SysTaskCall,
            56 => ObjectKind::SysFuncCall,
            _ => ObjectKind::Other,
        }
    }

    pub fn as_vpi(self) -> Option<i32> {
        match self {
            ObjectKind::Constant => Some(7),
            ObjectKind::Parameter => Some(41),
            ObjectKind::IntegerVar => Some(25),
            ObjectKind::MemoryWord => Some(30),
            ObjectKind::Memory => Some(29),
            ObjectKind::Net => Some(36),
            ObjectKind::PartSelect => Some(42),
            ObjectKind::RealVar => Some(47),
            ObjectKind::Reg => Some(48),
            ObjectKind::TimeVar => Some(63),
            ObjectKind::Module => Some(32),
            ObjectKind::Task => Some(59),
            ObjectKind::Function => Some(20),
            ObjectKind::NamedBegin => Some(33),
            ObjectKind::NamedFork => Some(34),
            ObjectKind::SysTaskCall => Some(57),
            ObjectKind::SysFuncCall => Some(56),
            ObjectKind::Other => None,
        }
    }

    /// True for kinds that carry a constant-subkind tag (`vpiConstType`).
    pub fn has_const_kind(self) -> bool {
        matches!(self, ObjectKind::Constant | ObjectKind::Parameter)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal subtype of a constant or parameter, as reported for `vpiConstType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstKind {
    Decimal,
    Real,
    Binary,
    Octal,
    Hex,
    String,
    Int,
    Time,
}

impl ConstKind {
    const ALL: [ConstKind; 8] = [
        ConstKind::Decimal,
        ConstKind::Real,
        ConstKind::Binary,
        ConstKind::Octal,
        ConstKind::Hex,
        ConstKind::String,
        ConstKind::Int,
        ConstKind::Time,
    ];

    pub fn all() -> &'static [ConstKind] {
        &Self::ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstKind::Decimal => "decimal",
            ConstKind::Real => "real",
            ConstKind::Binary => "binary",
            ConstKind::Octal => "octal",
            ConstKind::Hex => "hex",
            ConstKind::String => "string",
            ConstKind::Int => "int",
            ConstKind::Time => "time",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    pub fn from_vpi(code: i32) -> Option<Self> {
        match code {
            1 => Some(ConstKind::Decimal),
            2 => Some(ConstKind::Real),
            3 => Some(ConstKind::Binary),
            4 => Some(ConstKind::Octal),
            5 => Some(ConstKind::Hex),
            6 => Some(ConstKind::String),
            7 => Some(ConstKind::Int),
            8 => Some(ConstKind::Time),
            _ => None,
        }
    }

    pub fn as_vpi(self) -> i32 {
        match self {
            ConstKind::Decimal => 1,
            ConstKind::Real => 2,
            ConstKind::Binary => 3,
            ConstKind::Octal => 4,
            ConstKind::Hex => 5,
            ConstKind::String => 6,
            ConstKind::Int => 7,
            ConstKind::Time => 8,
        }
    }
}

impl fmt::Display for ConstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The standard compile-time check shapes a routine can be registered with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureId {
    #[default]
    NoArg,
    OneNumeric,
    OneOptNumeric,
    TwoNumeric,
    OneString,
}

impl SignatureId {
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureId::NoArg => "no-arg",
            SignatureId::OneNumeric => "one-numeric",
            SignatureId::OneOptNumeric => "one-opt-numeric",
            SignatureId::TwoNumeric => "two-numeric",
            SignatureId::OneString => "one-string",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "no-arg" => Some(SignatureId::NoArg),
            "one-numeric" => Some(SignatureId::OneNumeric),
            "one-opt-numeric" => Some(SignatureId::OneOptNumeric),
            "two-numeric" => Some(SignatureId::TwoNumeric),
            "one-string" => Some(SignatureId::OneString),
            _ => None,
        }
    }
}

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SignatureIdParseError {
    value: String,
}

impl fmt::Display for SignatureIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid signature {:?} (expected one of: no-arg, one-numeric, one-opt-numeric, two-numeric, one-string)",
            self.value
        )
    }
}

impl std::error::Error for SignatureIdParseError {}

impl FromStr for SignatureId {
    type Err = SignatureIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureId::parse(s).ok_or_else(|| SignatureIdParseError {
            value: s.trim().to_string(),
        })
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for SignatureId {
    fn value_variants<'a>() -> &'a [Self] {
        const ALL: [SignatureId; 5] = [
            SignatureId::NoArg,
            SignatureId::OneNumeric,
            SignatureId::OneOptNumeric,
            SignatureId::TwoNumeric,
            SignatureId::OneString,
        ];
        &ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}
