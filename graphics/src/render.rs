//! The render thread.
//!
//! The loop sleeps on the scene condition variable until an event marks
//! the scene dirty, an animation is running, or shutdown is requested.
//! Each pass advances the animation one step and composites a frame while
//! holding the lock. Between animation frames the lock is released so
//! event sources can get in.

use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::animator::Shared;
use crate::error::{AnimatorError, Result};
use crate::scene::Scene;
use crate::sched::{PolicySwitch, SchedulingPolicy};

const THREAD_NAME: &str = "coverflow-render";

/// Handle to the running render thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct RenderThread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    pub(crate) fn spawn(shared: Arc<Shared>) -> Result<Self> {
        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || render_loop(&worker))
            .map_err(AnimatorError::ThreadSpawn)?;
        log::info!("[Coverflow Render] Started {}", THREAD_NAME);
        Ok(RenderThread {
            shared,
            handle: Some(handle),
        })
    }

    /// Ask the thread to stop and wait for it.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.shared
            .scene
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .request_shutdown();
        self.shared.wake.notify_all();
        handle.join().map_err(|_| AnimatorError::RenderThreadPanicked)
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("[Coverflow Render] {}", e);
        }
    }
}

/// One step-plus-composite pass. Raises to `realtime` when an animation
/// is about to run and drops back to normal once it has finished, so the
/// thread never blocks while real-time.
fn render_pass(scene: &mut Scene, policy: &mut PolicySwitch, realtime: SchedulingPolicy) {
    if scene.is_animating() {
        policy.switch_to(realtime);
    }
    scene.step();
    if !scene.is_animating() {
        policy.switch_to(SchedulingPolicy::Normal);
    }
}

fn render_loop(shared: &Shared) {
    let mut scene = match shared.lock() {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("[Coverflow Render] {}", e);
            return;
        }
    };
    let interval = Duration::from_millis(scene.config().render.frame_interval_ms);
    let realtime = SchedulingPolicy::RoundRobin {
        priority: scene.config().render.realtime_priority,
    };
    let mut policy = PolicySwitch::default();

    loop {
        while !scene.has_work() {
            scene = match shared.wake.wait(scene) {
                Ok(scene) => scene,
                Err(_) => {
                    log::error!("[Coverflow Render] {}", AnimatorError::LockPoisoned);
                    return;
                }
            };
        }
        if scene.is_shutdown() {
            break;
        }

        render_pass(&mut scene, &mut policy, realtime);

        if scene.is_animating() {
            drop(scene);
            if interval.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(interval);
            }
            scene = match shared.lock() {
                Ok(scene) => scene,
                Err(e) => {
                    log::error!("[Coverflow Render] {}", e);
                    return;
                }
            };
        }
    }

    let frames = scene.frames();
    drop(scene);
    policy.switch_to(SchedulingPolicy::Normal);
    log::info!("[Coverflow Render] Stopped after {} frames", frames);
}
