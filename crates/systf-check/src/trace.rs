//! In-memory kernel stand-in driven by a recorded elaboration trace.
//!
//! A trace lists the objects the kernel knows about and every system
//! task/function call it elaborated. `TraceHost` answers the [`Host`] queries
//! from that table and captures what a real kernel would print or act on.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use systf_contracts::SYSTF_TRACE_SCHEMA_VERSION;
use systf_objects::{ConstKind, ObjectKind};
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::gate::FinishLatch;
use crate::host::{Handle, Host};
use crate::registry::{Registry, RegistryError};
use crate::scope;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trace {
    pub schema_version: String,
    #[serde(default)]
    pub objects: Vec<TraceObject>,
    #[serde(default)]
    pub calls: Vec<TraceCall>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceObject {
    pub id: Handle,
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub const_kind: Option<ConstKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Handle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceCall {
    pub id: Handle,
    pub routine: String,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Handle>,
    #[serde(default)]
    pub args: Vec<Handle>,
}

pub fn parse_trace(bytes: &[u8]) -> Result<Trace> {
    let trace: Trace = serde_json::from_slice(bytes).context("parse trace json")?;
    if trace.schema_version != SYSTF_TRACE_SCHEMA_VERSION {
        anyhow::bail!(
            "trace schema_version mismatch: expected {SYSTF_TRACE_SCHEMA_VERSION} got {:?}",
            trace.schema_version
        );
    }
    Ok(trace)
}

#[derive(Debug, Clone)]
struct Node {
    kind: ObjectKind,
    const_kind: Option<ConstKind>,
    scope: Option<Handle>,
    file: Option<String>,
    line: u32,
}

#[derive(Debug, Clone)]
pub struct TraceHost {
    nodes: BTreeMap<Handle, Node>,
    args: BTreeMap<Handle, Vec<Handle>>,
    calls: Vec<(Handle, String)>,
    current: Option<Handle>,
    output: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    finish: FinishLatch,
}

impl TraceHost {
    /// Rejects duplicate ids and references to objects the trace never declares.
    /// Scope chains are not checked here; a chain that never reaches a module is
    /// reported when it is walked.
    pub fn from_trace(trace: Trace) -> Result<Self> {
        let mut nodes = BTreeMap::new();
        for obj in &trace.objects {
            let node = Node {
                kind: obj.kind,
                const_kind: obj.const_kind,
                scope: obj.scope,
                file: None,
                line: 0,
            };
            if nodes.insert(obj.id, node).is_some() {
                anyhow::bail!("duplicate trace id {}", obj.id);
            }
        }

        let mut args = BTreeMap::new();
        let mut calls = Vec::with_capacity(trace.calls.len());
        for call in &trace.calls {
            let node = Node {
                kind: ObjectKind::SysTaskCall,
                const_kind: None,
                scope: call.scope,
                file: Some(call.file.clone()),
                line: call.line,
            };
            if nodes.insert(call.id, node).is_some() {
                anyhow::bail!("duplicate trace id {}", call.id);
            }
            args.insert(call.id, call.args.clone());
            calls.push((call.id, call.routine.clone()));
        }

        let known: BTreeSet<Handle> = nodes.keys().copied().collect();
        for (id, node) in &nodes {
            if let Some(s) = node.scope {
                if !known.contains(&s) {
                    anyhow::bail!("object {id} refers to unknown scope {s}");
                }
            }
        }
        for (call, list) in &args {
            for a in list {
                if !known.contains(a) {
                    anyhow::bail!("call {call} refers to unknown argument {a}");
                }
            }
        }

        debug!(objects = nodes.len(), calls = calls.len(), "loaded trace");
        Ok(TraceHost {
            nodes,
            args,
            calls,
            current: None,
            output: Vec::new(),
            diagnostics: Vec::new(),
            finish: FinishLatch::default(),
        })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::from_trace(parse_trace(bytes)?)
    }

    /// Call handles with their routine names, in elaboration order.
    pub fn calls(&self) -> Vec<(Handle, String)> {
        self.calls.clone()
    }

    pub fn enter(&mut self, call: Handle) {
        self.current = Some(call);
    }

    pub fn leave(&mut self) {
        self.current = None;
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finish_code(&self) -> Option<i32> {
        self.finish.finish_code()
    }

    pub fn finish_requests(&self) -> u32 {
        self.finish.requests()
    }
}

impl Host for TraceHost {
    type Args = std::vec::IntoIter<Handle>;

    fn current_call(&self) -> Option<Handle> {
        self.current
    }

    fn arguments(&mut self, call: Handle) -> Self::Args {
        self.args.get(&call).cloned().unwrap_or_default().into_iter()
    }

    fn kind(&self, handle: Handle) -> ObjectKind {
        self.nodes
            .get(&handle)
            .map(|n| n.kind)
            .unwrap_or(ObjectKind::Other)
    }

    fn const_kind(&self, handle: Handle) -> Option<ConstKind> {
        self.nodes.get(&handle).and_then(|n| n.const_kind)
    }

    fn file(&self, handle: Handle) -> Option<String> {
        self.nodes.get(&handle).and_then(|n| n.file.clone())
    }

    fn line(&self, handle: Handle) -> u32 {
        self.nodes.get(&handle).map(|n| n.line).unwrap_or(0)
    }

    fn scope(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(&handle).and_then(|n| n.scope)
    }

    fn print(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
        for line in diagnostic.render_lines() {
            self.print(&line);
        }
    }

    fn request_finish(&mut self, code: i32) {
        self.finish.arm(code);
    }
}

/// Runs the registered check for every call in the trace, in order.
///
/// Each call site must sit inside a module. Returns the number of calls checked.
pub fn check_trace(host: &mut TraceHost, registry: &Registry) -> Result<usize, RegistryError> {
    let calls = host.calls();
    for (call, routine) in &calls {
        host.enter(*call);
        let result = scope::nearest_module(&*host, *call)
            .map_err(RegistryError::from)
            .and_then(|_| registry.compiletf(host, routine));
        host.leave();
        result?;
    }
    Ok(calls.len())
}

/// Assembles traces for tests and fixtures.
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    next: NonZeroU32,
    objects: Vec<TraceObject>,
    calls: Vec<TraceCall>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        TraceBuilder {
            next: NonZeroU32::MIN,
            objects: Vec::new(),
            calls: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Handle {
        let h = Handle::from(self.next);
        self.next = self.next.saturating_add(1);
        h
    }

    fn push(
        &mut self,
        kind: ObjectKind,
        const_kind: Option<ConstKind>,
        name: Option<&str>,
        scope: Option<Handle>,
    ) -> Handle {
        let id = self.alloc();
        self.objects.push(TraceObject {
            id,
            kind,
            const_kind,
            name: name.map(str::to_string),
            scope,
        });
        id
    }

    pub fn module(&mut self, name: &str) -> Handle {
        self.push(ObjectKind::Module, None, Some(name), None)
    }

    pub fn module_in(&mut self, name: &str, parent: Handle) -> Handle {
        self.push(ObjectKind::Module, None, Some(name), Some(parent))
    }

    pub fn scope(&mut self, kind: ObjectKind, parent: Handle) -> Handle {
        self.push(kind, None, None, Some(parent))
    }

    pub fn object(&mut self, kind: ObjectKind, scope: Handle) -> Handle {
        self.push(kind, None, None, Some(scope))
    }

    pub fn constant(&mut self, const_kind: ConstKind, scope: Handle) -> Handle {
        self.push(ObjectKind::Constant, Some(const_kind), None, Some(scope))
    }

    pub fn parameter(&mut self, const_kind: ConstKind, scope: Handle) -> Handle {
        self.push(ObjectKind::Parameter, Some(const_kind), None, Some(scope))
    }

    /// An object with no enclosing scope at all.
    pub fn orphan(&mut self, kind: ObjectKind) -> Handle {
        self.push(kind, None, None, None)
    }

    pub fn call(
        &mut self,
        routine: &str,
        file: &str,
        line: u32,
        scope: Handle,
        args: &[Handle],
    ) -> Handle {
        let id = self.alloc();
        self.calls.push(TraceCall {
            id,
            routine: routine.to_string(),
            file: file.to_string(),
            line,
            scope: Some(scope),
            args: args.to_vec(),
        });
        id
    }

    pub fn build(self) -> Trace {
        Trace {
            schema_version: SYSTF_TRACE_SCHEMA_VERSION.to_string(),
            objects: self.objects,
            calls: self.calls,
        }
    }

    pub fn build_host(self) -> Result<TraceHost> {
        TraceHost::from_trace(self.build())
    }
}
