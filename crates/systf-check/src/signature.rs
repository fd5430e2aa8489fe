//! Arity/type contracts and the compile-time check that enforces them.
//!
//! A check reports every defect it can still meaningfully detect: a wrong type
//! at one position does not stop the others from being checked. Only a missing
//! argument ends the check early, since later positions have nothing to line up
//! with.

use serde::{Deserialize, Serialize};
use systf_contracts::{COMPILETF_OK, FINISH_CODE_ERROR};
use systf_objects::SignatureId;
use tracing::debug;

use crate::classify::{self, ObjectTag};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::gate;
use crate::host::{ArgSequence, CallSite, Handle, Host, HostFault};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgPredicate {
    Numeric,
    String,
    Any,
}

impl ArgPredicate {
    pub fn accepts(self, tag: ObjectTag) -> bool {
        match self {
            ArgPredicate::Numeric => classify::is_numeric(tag),
            ArgPredicate::String => classify::is_string(tag),
            ArgPredicate::Any => true,
        }
    }

    fn adjective(self) -> Option<&'static str> {
        match self {
            ArgPredicate::Numeric => Some("numeric"),
            ArgPredicate::String => Some("string"),
            ArgPredicate::Any => None,
        }
    }

    /// Completes "argument must be ...".
    fn expectation(self) -> &'static str {
        match self {
            ArgPredicate::Numeric => "numeric",
            ArgPredicate::String => "a string",
            ArgPredicate::Any => "present",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub required: &'static [ArgPredicate],
    pub optional: &'static [ArgPredicate],
}

pub const NO_ARG: Signature = Signature {
    required: &[],
    optional: &[],
};

pub const ONE_NUMERIC: Signature = Signature {
    required: &[ArgPredicate::Numeric],
    optional: &[],
};

pub const ONE_OPT_NUMERIC: Signature = Signature {
    required: &[],
    optional: &[ArgPredicate::Numeric],
};

pub const TWO_NUMERIC: Signature = Signature {
    required: &[ArgPredicate::Numeric, ArgPredicate::Numeric],
    optional: &[],
};

pub const ONE_STRING: Signature = Signature {
    required: &[ArgPredicate::String],
    optional: &[],
};

pub fn signature_for(id: SignatureId) -> &'static Signature {
    match id {
        SignatureId::NoArg => &NO_ARG,
        SignatureId::OneNumeric => &ONE_NUMERIC,
        SignatureId::OneOptNumeric => &ONE_OPT_NUMERIC,
        SignatureId::TwoNumeric => &TWO_NUMERIC,
        SignatureId::OneString => &ONE_STRING,
    }
}

fn count_word(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS
        .get(n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}

fn ordinal_word(position: usize) -> String {
    const WORDS: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];
    match position.checked_sub(1).and_then(|i| WORDS.get(i)) {
        Some(w) => w.to_string(),
        None => {
            let suffix = match (position % 10, position % 100) {
                (_, 11..=13) => "th",
                (1, _) => "st",
                (2, _) => "nd",
                (3, _) => "rd",
                _ => "th",
            };
            format!("{position}{suffix}")
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// "numeric argument", "string arguments", "argument", ...
fn noun(preds: &[ArgPredicate], n: usize) -> String {
    let first = preds.first().copied();
    let uniform = first.filter(|p| preds.iter().all(|q| q == p));
    match uniform.and_then(ArgPredicate::adjective) {
        Some(adj) => format!("{adj} argument{}", plural(n)),
        None => format!("argument{}", plural(n)),
    }
}

impl Signature {
    pub fn min_args(&self) -> usize {
        self.required.len()
    }

    pub fn max_args(&self) -> usize {
        self.required.len() + self.optional.len()
    }

    fn positions(&self) -> impl Iterator<Item = ArgPredicate> + '_ {
        self.required.iter().chain(self.optional.iter()).copied()
    }

    fn all_preds(&self) -> Vec<ArgPredicate> {
        self.positions().collect()
    }

    /// Body of the message for a call with no arguments at all.
    pub fn requires_phrase(&self) -> String {
        let n = self.min_args();
        if n == 1 {
            format!("requires a single {}", noun(self.required, 1))
        } else {
            format!("requires {} {}", count_word(n), noun(self.required, n))
        }
    }

    /// Body of the message for a call with surplus arguments.
    pub fn takes_phrase(&self) -> String {
        let min = self.min_args();
        let max = self.max_args();
        let preds = self.all_preds();
        if max == 0 {
            "does not take an argument".to_string()
        } else if min == 0 {
            format!("takes at most {} {}", count_word(max), noun(&preds, max))
        } else if min == max && max == 1 {
            format!("takes a single {}", noun(&preds, 1))
        } else if min == max {
            format!("takes {} {}", count_word(max), noun(&preds, max))
        } else {
            format!(
                "takes {} to {} {}",
                count_word(min),
                count_word(max),
                noun(&preds, max)
            )
        }
    }
}

fn wrong_type_message(name: &str, sig: &Signature, position: usize, expected: ArgPredicate) -> String {
    if sig.max_args() == 1 {
        format!("{name}'s argument must be {}.", expected.expectation())
    } else {
        format!(
            "{name}'s {} argument must be {}.",
            ordinal_word(position),
            expected.expectation()
        )
    }
}

fn missing_nth_message(name: &str, position: usize, expected: ArgPredicate) -> String {
    match expected.adjective() {
        Some(adj) => format!("{name} requires a {} ({adj}) argument.", ordinal_word(position)),
        None => format!("{name} requires a {} argument.", ordinal_word(position)),
    }
}

struct Check<'a, H: Host + ?Sized> {
    host: &'a mut H,
    call: &'a CallSite,
    sig: &'a Signature,
}

impl<H: Host + ?Sized> Check<'_, H> {
    fn report(&mut self, diagnostic: Diagnostic) {
        debug!(
            code = diagnostic.code,
            routine = %diagnostic.routine,
            line = diagnostic.line,
            "signature check failed"
        );
        self.host.emit(&diagnostic);
        gate::arm(&mut *self.host, self.call, FINISH_CODE_ERROR);
    }

    fn check_position(
        &mut self,
        arg: Handle,
        position: usize,
        expected: ArgPredicate,
    ) -> Result<(), HostFault> {
        let tag = ObjectTag::of(&*self.host, arg)?;
        if !expected.accepts(tag) {
            let message = wrong_type_message(&self.call.name, self.sig, position, expected);
            let kind = DiagnosticKind::WrongArgumentType { position, expected };
            self.report(Diagnostic::error(self.call, kind, message));
        }
        Ok(())
    }
}

/// Checks the current call against `sig`, reporting through `host`.
///
/// User mistakes never surface as `Err`: they become diagnostics plus a finish
/// request, and the return is always `COMPILETF_OK`. `Err` means the host broke
/// its own invariants.
pub fn check_call<H: Host + ?Sized>(
    host: &mut H,
    name: &str,
    sig: &Signature,
) -> Result<i32, HostFault> {
    let call = CallSite::current(&*host, name)?;
    debug!(routine = name, file = %call.file, line = call.line, "checking call site");
    let mut args = ArgSequence::new(host.arguments(call.handle));
    let mut check = Check {
        host,
        call: &call,
        sig,
    };

    let Some(first) = args.pull() else {
        if sig.min_args() > 0 {
            let message = format!("{name} {}.", sig.requires_phrase());
            check.report(Diagnostic::error(
                &call,
                DiagnosticKind::MissingRequiredArgument,
                message,
            ));
        }
        return Ok(COMPILETF_OK);
    };

    let mut next = Some(first);
    for (i, expected) in sig.positions().enumerate() {
        let position = i + 1;
        let arg = match next {
            Some(arg) => arg,
            None if i < sig.min_args() => {
                let message = missing_nth_message(name, position, expected);
                check.report(Diagnostic::error(
                    &call,
                    DiagnosticKind::MissingSecondArgument { position },
                    message,
                ));
                return Ok(COMPILETF_OK);
            }
            // Optional tail not supplied.
            None => return Ok(COMPILETF_OK),
        };
        check.check_position(arg, position, expected)?;
        next = args.pull();
    }

    // `next` already holds the first surplus element, if any.
    if next.is_some() {
        let count = 1 + args.drain_count();
        let message = format!("{name} {}.", sig.takes_phrase());
        let continuation = format!("Found {count} extra argument{}.", plural(count));
        check.report(
            Diagnostic::error(&call, DiagnosticKind::ExtraArguments { count }, message)
                .with_continuation(continuation),
        );
    }

    Ok(COMPILETF_OK)
}

/// For routines that take no argument.
pub fn no_arg_compiletf<H: Host + ?Sized>(host: &mut H, name: &str) -> Result<i32, HostFault> {
    check_call(host, name, &NO_ARG)
}

pub fn one_numeric_arg_compiletf<H: Host + ?Sized>(
    host: &mut H,
    name: &str,
) -> Result<i32, HostFault> {
    check_call(host, name, &ONE_NUMERIC)
}

pub fn one_opt_numeric_arg_compiletf<H: Host + ?Sized>(
    host: &mut H,
    name: &str,
) -> Result<i32, HostFault> {
    check_call(host, name, &ONE_OPT_NUMERIC)
}

pub fn two_numeric_args_compiletf<H: Host + ?Sized>(
    host: &mut H,
    name: &str,
) -> Result<i32, HostFault> {
    check_call(host, name, &TWO_NUMERIC)
}

pub fn one_string_arg_compiletf<H: Host + ?Sized>(
    host: &mut H,
    name: &str,
) -> Result<i32, HostFault> {
    check_call(host, name, &ONE_STRING)
}
