use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use systf_contracts::SYSTF_ROUTINES_SCHEMA_VERSION;
use systf_objects::SignatureId;
use thiserror::Error;
use tracing::{debug, error};

use crate::host::{Host, HostFault};
use crate::signature::{check_call, signature_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Task,
    Function,
}

impl RoutineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoutineKind::Task => "task",
            RoutineKind::Function => "function",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Routine {
    pub name: String,
    pub kind: RoutineKind,
    pub signature: SignatureId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutineTable {
    pub schema_version: String,
    pub routines: Vec<Routine>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid routine name: {0}")]
    InvalidName(String),
    #[error("routine already registered: {0}")]
    Duplicate(String),
    #[error("unknown routine: {0}")]
    UnknownRoutine(String),
    #[error(transparent)]
    Host(#[from] HostFault),
}

const BUILTINS: &[(&str, RoutineKind, SignatureId)] = &[
    ("$finish", RoutineKind::Task, SignatureId::OneOptNumeric),
    ("$stop", RoutineKind::Task, SignatureId::OneOptNumeric),
    ("$time", RoutineKind::Function, SignatureId::NoArg),
    ("$stime", RoutineKind::Function, SignatureId::NoArg),
    ("$realtime", RoutineKind::Function, SignatureId::NoArg),
    ("$simtime", RoutineKind::Function, SignatureId::NoArg),
    ("$dumpfile", RoutineKind::Task, SignatureId::OneString),
    ("$dumpoff", RoutineKind::Task, SignatureId::NoArg),
    ("$dumpon", RoutineKind::Task, SignatureId::NoArg),
    ("$dumpall", RoutineKind::Task, SignatureId::NoArg),
    ("$dumpflush", RoutineKind::Task, SignatureId::NoArg),
    ("$dumplimit", RoutineKind::Task, SignatureId::OneNumeric),
    ("$itor", RoutineKind::Function, SignatureId::OneNumeric),
    ("$rtoi", RoutineKind::Function, SignatureId::OneNumeric),
    ("$bitstoreal", RoutineKind::Function, SignatureId::OneNumeric),
    ("$realtobits", RoutineKind::Function, SignatureId::OneNumeric),
    ("$clog2", RoutineKind::Function, SignatureId::OneNumeric),
    ("$ln", RoutineKind::Function, SignatureId::OneNumeric),
    ("$log10", RoutineKind::Function, SignatureId::OneNumeric),
    ("$exp", RoutineKind::Function, SignatureId::OneNumeric),
    ("$sqrt", RoutineKind::Function, SignatureId::OneNumeric),
    ("$pow", RoutineKind::Function, SignatureId::TwoNumeric),
    ("$atan2", RoutineKind::Function, SignatureId::TwoNumeric),
    ("$hypot", RoutineKind::Function, SignatureId::TwoNumeric),
    ("$countdrivers", RoutineKind::Function, SignatureId::OneNumeric),
    ("$readmempath", RoutineKind::Task, SignatureId::OneString),
];

pub fn validate_routine_name(name: &str) -> Result<(), String> {
    let Some(rest) = name.strip_prefix('$') else {
        return Err(format!("routine name must start with '$': {name:?}"));
    };
    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return Err(format!("routine name must not be empty: {name:?}"));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!(
            "invalid routine name start (must be [A-Za-z_] after '$'): {name:?}"
        ));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Err(format!(
                "invalid routine name char (allowed [A-Za-z0-9_$]): {name:?}"
            ));
        }
    }
    Ok(())
}

/// Registered system tasks/functions and the compile-time check each one uses.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    routines: BTreeMap<String, Routine>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for &(name, kind, signature) in BUILTINS {
            reg.routines.insert(
                name.to_string(),
                Routine {
                    name: name.to_string(),
                    kind,
                    signature,
                },
            );
        }
        reg
    }

    pub fn register(&mut self, routine: Routine) -> Result<(), RegistryError> {
        validate_routine_name(&routine.name).map_err(RegistryError::InvalidName)?;
        if self.routines.contains_key(&routine.name) {
            return Err(RegistryError::Duplicate(routine.name));
        }
        debug!(
            name = %routine.name,
            kind = routine.kind.as_str(),
            signature = routine.signature.as_str(),
            "registered routine"
        );
        self.routines.insert(routine.name.clone(), routine);
        Ok(())
    }

    pub fn register_table(&mut self, table: RoutineTable) -> Result<(), RegistryError> {
        for routine in table.routines {
            self.register(routine)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Routine> {
        self.routines.values()
    }

    /// Runs the compile-time check registered for `name` on the host's current call.
    pub fn compiletf<H: Host + ?Sized>(&self, host: &mut H, name: &str) -> Result<i32, RegistryError> {
        let routine = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownRoutine(name.to_string()))?;
        check_call(host, name, signature_for(routine.signature)).map_err(|fault| {
            error!(routine = name, %fault, "host fault during compile-time check");
            RegistryError::Host(fault)
        })
    }
}

pub fn parse_routine_table(bytes: &[u8]) -> anyhow::Result<RoutineTable> {
    let table: RoutineTable = serde_json::from_slice(bytes)?;
    if table.schema_version != SYSTF_ROUTINES_SCHEMA_VERSION {
        anyhow::bail!(
            "routine table schema_version mismatch: expected {SYSTF_ROUTINES_SCHEMA_VERSION} got {:?}",
            table.schema_version
        );
    }
    Ok(table)
}
