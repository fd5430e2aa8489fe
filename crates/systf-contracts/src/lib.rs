//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable I/O (diagnostic reports, elaboration traces and
//! routine tables).

pub const SYSTF_DIAG_SCHEMA_VERSION: &str = "systf.diag@0.1.0";
pub const SYSTF_CHECK_REPORT_SCHEMA_VERSION: &str = "systf-check.report@0.1.0";
pub const SYSTF_TRACE_SCHEMA_VERSION: &str = "systf.trace@0.1.0";
pub const SYSTF_ROUTINES_SCHEMA_VERSION: &str = "systf.routines@0.1.0";

/// Status every compile-time check returns to the kernel. Failures travel
/// through diagnostics and the finish request, never through this value.
pub const COMPILETF_OK: i32 = 0;

/// Finish code requested when a call site fails its signature check.
pub const FINISH_CODE_ERROR: i32 = 1;
