//! OS scheduling policy for the render thread.
//!
//! On Linux the render thread switches itself to `SCHED_RR` for the
//! duration of an animation and back to `SCHED_OTHER` once idle. Elsewhere
//! the switch is a no-op. Either way it is only a hint: a failure never
//! stops rendering.

use crate::error::Result;

/// Scheduling class requested for the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingPolicy {
    /// Default time-sharing policy.
    #[default]
    Normal,
    /// Real-time round-robin at the given priority.
    RoundRobin { priority: i32 },
}

/// Apply `policy` to the calling thread.
pub fn apply_policy(policy: SchedulingPolicy) -> Result<()> {
    imp::apply(policy)
}

#[cfg(target_os = "linux")]
mod imp {
    use std::io;

    use super::SchedulingPolicy;
    use crate::error::{AnimatorError, Result};

    pub(super) fn apply(policy: SchedulingPolicy) -> Result<()> {
        let (class, priority) = match policy {
            SchedulingPolicy::Normal => (libc::SCHED_OTHER, 0),
            SchedulingPolicy::RoundRobin { priority } => {
                // SAFETY: plain queries without pointer arguments.
                let (min, max) = unsafe {
                    (
                        libc::sched_get_priority_min(libc::SCHED_RR),
                        libc::sched_get_priority_max(libc::SCHED_RR),
                    )
                };
                (libc::SCHED_RR, priority.clamp(min, max.max(min)))
            }
        };
        let param = libc::sched_param {
            sched_priority: priority,
        };
        // SAFETY: pid 0 targets the calling thread and `param` outlives the
        // call.
        let rc = unsafe { libc::sched_setscheduler(0, class, &param) };
        if rc != 0 {
            return Err(AnimatorError::Scheduling(io::Error::last_os_error()));
        }
        log::trace!("[Coverflow Sched] Applied {:?}", policy);
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::SchedulingPolicy;
    use crate::error::Result;

    pub(super) fn apply(policy: SchedulingPolicy) -> Result<()> {
        log::trace!("[Coverflow Sched] {:?} not supported on this platform", policy);
        Ok(())
    }
}

/// Tracks the policy the render thread is running under and warns about
/// the first failed switch only.
#[derive(Debug, Default)]
pub(crate) struct PolicySwitch {
    current: SchedulingPolicy,
    warned: bool,
    #[cfg(test)]
    requested: Vec<SchedulingPolicy>,
}

impl PolicySwitch {
    pub(crate) fn current(&self) -> SchedulingPolicy {
        self.current
    }

    /// Switch to `target` unless already there.
    pub(crate) fn switch_to(&mut self, target: SchedulingPolicy) {
        if self.current == target {
            return;
        }
        #[cfg(test)]
        self.requested.push(target);
        match apply_policy(target) {
            Ok(()) => {
                log::debug!("[Coverflow Sched] {:?} -> {:?}", self.current, target);
                self.current = target;
            }
            Err(e) => {
                if !self.warned {
                    log::warn!("[Coverflow Sched] Could not switch to {:?}: {}", target, e);
                    self.warned = true;
                }
            }
        }
    }

    /// Every policy change actually attempted, in order.
    #[cfg(test)]
    pub(crate) fn requested(&self) -> &[SchedulingPolicy] {
        &self.requested
    }
}
