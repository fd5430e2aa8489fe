use std::fmt;
use std::iter::Fuse;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use systf_objects::{ConstKind, ObjectKind};
use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// Non-owning token for a kernel-resident object.
///
/// A handle is only meaningful while the callback that received it is running.
/// Nothing in this crate stores one past the callback's return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(NonZeroU32);

impl Handle {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Handle)
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

impl From<NonZeroU32> for Handle {
    fn from(raw: NonZeroU32) -> Self {
        Handle(raw)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host state that contradicts the kernel's own invariants.
///
/// These never describe a user mistake; callers treat them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostFault {
    #[error("no system task/function call is active")]
    NoCurrentCall,
    #[error("call {call} has no source file")]
    MissingFile { call: Handle },
    #[error("{kind} handle {handle} reports no constant kind")]
    MissingConstKind { handle: Handle, kind: ObjectKind },
    #[error("scope chain of {handle} ends at {last} before reaching a module")]
    ScopeChainBroken { handle: Handle, last: Handle },
    #[error("scope chain of {handle} exceeds {limit} hops")]
    ScopeChainTooDeep { handle: Handle, limit: usize },
}

/// Location and routine name of the call being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub handle: Handle,
    pub file: String,
    pub line: u32,
    pub name: String,
}

impl CallSite {
    pub fn current<H: Host + ?Sized>(host: &H, name: &str) -> Result<Self, HostFault> {
        let handle = host.current_call().ok_or(HostFault::NoCurrentCall)?;
        let file = host
            .file(handle)
            .ok_or(HostFault::MissingFile { call: handle })?;
        Ok(CallSite {
            handle,
            file,
            line: host.line(handle),
            name: name.to_string(),
        })
    }
}

/// Forward-only cursor over a call's arguments.
///
/// Once `pull` returns `None` every later pull does too; the sequence cannot be
/// restarted.
#[derive(Debug)]
pub struct ArgSequence<I: Iterator<Item = Handle>> {
    inner: Fuse<I>,
}

impl<I: Iterator<Item = Handle>> ArgSequence<I> {
    pub fn new(inner: I) -> Self {
        ArgSequence {
            inner: inner.fuse(),
        }
    }

    pub fn pull(&mut self) -> Option<Handle> {
        self.inner.next()
    }

    /// Consumes the rest of the sequence and returns how many elements it held.
    pub fn drain_count(&mut self) -> usize {
        let mut n = 0;
        while self.pull().is_some() {
            n += 1;
        }
        n
    }
}

/// Services the simulation kernel provides to a compile-time check.
pub trait Host {
    type Args: Iterator<Item = Handle>;

    /// The system task/function call currently being elaborated.
    fn current_call(&self) -> Option<Handle>;

    /// Arguments of `call`, in source order. The iterator must not borrow the host.
    fn arguments(&mut self, call: Handle) -> Self::Args;

    fn kind(&self, handle: Handle) -> ObjectKind;

    fn const_kind(&self, handle: Handle) -> Option<ConstKind>;

    fn file(&self, handle: Handle) -> Option<String>;

    fn line(&self, handle: Handle) -> u32;

    /// Enclosing scope of `handle`, if the kernel knows one.
    fn scope(&self, handle: Handle) -> Option<Handle>;

    /// Writes one line of text to the kernel's message sink.
    fn print(&mut self, line: &str);

    fn emit(&mut self, diagnostic: &Diagnostic) {
        for line in diagnostic.render_lines() {
            self.print(&line);
        }
    }

    /// Asks the kernel to finish with `code` once the current callback returns.
    fn request_finish(&mut self, code: i32);
}
