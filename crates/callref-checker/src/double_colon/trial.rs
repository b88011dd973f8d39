//! Sandboxed trial runner.

use crate::double_colon::ReferenceLhs;
use crate::error::ResolveResult;
use crate::trace::{BindingTrace, TrialResult};
use tracing::debug;

/// Run `body` in a fork of `trace`. Nothing it writes reaches `trace` until
/// the returned result is committed.
pub(crate) fn run_trial<T>(
    trace: &BindingTrace<'_>,
    name: &'static str,
    body: impl FnOnce(&mut BindingTrace<'_>) -> ResolveResult<Option<T>>,
) -> ResolveResult<TrialResult<T>> {
    let mut sandbox = trace.fork(name);
    let value = body(&mut sandbox)?;
    debug!(
        trial = name,
        success = value.is_some(),
        diagnostics = sandbox.diagnostics().len(),
        "trial finished"
    );
    Ok(TrialResult {
        value,
        log: sandbox.into_log(),
    })
}

/// What happened to the value interpretation of a left-hand side.
pub(crate) enum ValueTrial {
    /// A non-singleton value: committed, resolution is over.
    CommittedNow(ReferenceLhs),
    /// A singleton object value, or a failed attempt. Kept until the type
    /// interpretation has been tried.
    DeferredPendingTieBreak(TrialResult<ReferenceLhs>),
}
