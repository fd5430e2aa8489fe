//! Compile-time signature checks for system tasks and system functions.
//!
//! A kernel calls one check per call site while elaborating. The check pulls the
//! call's arguments, classifies each one and reports every defect it can find
//! through the host's message sink before arming the finish request.

pub mod classify;
pub mod diagnostics;
pub mod gate;
pub mod host;
pub mod limits;
pub mod registry;
pub mod scope;
pub mod signature;
pub mod time;
pub mod trace;

pub use host::{CallSite, Handle, Host, HostFault};
pub use signature::{check_call, ArgPredicate, Signature};
