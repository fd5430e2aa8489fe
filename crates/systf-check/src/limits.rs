pub const MAX_SCOPE_DEPTH: usize = 4096;
pub const MAX_TRACE_BYTES: usize = 16 * 1024 * 1024;

/// Hops the scope resolver may take before it treats the chain as corrupt.
pub fn max_scope_depth() -> usize {
    match std::env::var("SYSTF_MAX_SCOPE_DEPTH") {
        Ok(v) => v
            .parse::<usize>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(MAX_SCOPE_DEPTH),
        Err(_) => MAX_SCOPE_DEPTH,
    }
}

pub fn max_trace_bytes() -> usize {
    match std::env::var("SYSTF_MAX_TRACE_BYTES") {
        Ok(v) => v
            .parse::<usize>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(MAX_TRACE_BYTES),
        Err(_) => MAX_TRACE_BYTES,
    }
}
