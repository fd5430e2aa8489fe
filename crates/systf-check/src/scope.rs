use systf_objects::ObjectKind;
use tracing::error;

use crate::host::{Handle, Host, HostFault};
use crate::limits;

/// Walks `handle`'s enclosing scopes up to the nearest module. A module handle
/// is returned as is.
///
/// Any handle from a live call site has such a module; a chain that ends early
/// or runs past the depth limit means the host state is corrupt.
pub fn nearest_module<H: Host + ?Sized>(host: &H, handle: Handle) -> Result<Handle, HostFault> {
    let limit = limits::max_scope_depth();
    let mut cur = handle;
    let mut hops = 0usize;
    while host.kind(cur) != ObjectKind::Module {
        if hops == limit {
            error!(%handle, limit, "scope chain too deep");
            return Err(HostFault::ScopeChainTooDeep { handle, limit });
        }
        cur = match host.scope(cur) {
            Some(next) => next,
            None => {
                error!(%handle, last = %cur, "scope chain ends before a module");
                return Err(HostFault::ScopeChainBroken { handle, last: cur });
            }
        };
        hops += 1;
    }
    Ok(cur)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceBuilder;

    #[test]
    fn module_is_its_own_module() {
        let mut b = TraceBuilder::new();
        let top = b.module("top");
        let host = b.build_host().unwrap();
        assert_eq!(nearest_module(&host, top), Ok(top));
    }

    #[test]
    fn walks_nested_scopes() {
        let mut b = TraceBuilder::new();
        let top = b.module("top");
        let blk = b.scope(ObjectKind::NamedBegin, top);
        let task = b.scope(ObjectKind::Task, blk);
        let r = b.object(ObjectKind::Reg, task);
        let host = b.build_host().unwrap();
        assert_eq!(nearest_module(&host, r), Ok(top));
        assert_eq!(nearest_module(&host, task), Ok(top));
    }

    #[test]
    fn stops_at_innermost_module() {
        let mut b = TraceBuilder::new();
        let top = b.module("top");
        let child = b.module_in("u0", top);
        let r = b.object(ObjectKind::Net, child);
        let host = b.build_host().unwrap();
        assert_eq!(nearest_module(&host, r), Ok(child));
    }

    #[test]
    fn broken_chain_is_a_host_fault() {
        let mut b = TraceBuilder::new();
        let orphan = b.orphan(ObjectKind::Reg);
        let host = b.build_host().unwrap();
        assert_eq!(
            nearest_module(&host, orphan),
            Err(HostFault::ScopeChainBroken {
                handle: orphan,
                last: orphan
            })
        );
    }
}
