//! The animator handle shared by event sources and the render thread.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::compositor::FrameReport;
use crate::config::AnimatorConfig;
use crate::error::{AnimatorError, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::render::RenderThread;
use crate::reserved::ReservationId;
use crate::scene::{Command, Event, Scene, WindowEvent};
use crate::surface::WindowImage;
use crate::window::WindowId;

/// Scene plus the condition variable the render thread sleeps on.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) scene: Mutex<Scene>,
    pub(crate) wake: Condvar,
}

impl Shared {
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Scene>> {
        self.scene.lock().map_err(|_| AnimatorError::LockPoisoned)
    }
}

/// Cloneable handle to one animated screen.
///
/// Every mutator takes the lock, applies an [`Event`], marks the scene
/// dirty and wakes the render thread.
#[derive(Debug, Clone)]
pub struct Animator {
    shared: Arc<Shared>,
}

impl Animator {
    pub fn new(framebuffer: Framebuffer, config: AnimatorConfig) -> Result<Self> {
        let scene = Scene::new(framebuffer, config)?;
        log::info!(
            "[Coverflow] Animator ready, {}x{} screen",
            scene.framebuffer().width(),
            scene.framebuffer().height()
        );
        Ok(Animator {
            shared: Arc::new(Shared {
                scene: Mutex::new(scene),
                wake: Condvar::new(),
            }),
        })
    }

    /// Apply an event and wake the render thread.
    pub fn dispatch(&self, event: impl Into<Event>) -> Result<()> {
        let mut scene = self.shared.lock()?;
        scene.apply(event.into());
        drop(scene);
        self.shared.wake.notify_all();
        Ok(())
    }

    /// Report new content or placement for a window.
    pub fn update_window(
        &self,
        id: WindowId,
        image: Option<WindowImage>,
        screen_rect: Rect,
        reserved: bool,
    ) -> Result<()> {
        self.dispatch(WindowEvent::Updated {
            id,
            image,
            screen_rect,
            reserved,
        })
    }

    pub fn window_event(&self, event: WindowEvent) -> Result<()> {
        self.dispatch(event)
    }

    /// Parse and apply a navigation command token.
    pub fn command(&self, token: &str) -> Result<()> {
        self.dispatch(Command::parse(token))
    }

    pub fn add_reserved(&self, id: ReservationId, rect: Rect) -> Result<()> {
        self.dispatch(Event::Reserve { id, rect })
    }

    pub fn remove_reserved(&self, id: ReservationId) -> Result<()> {
        self.dispatch(Event::Release { id })
    }

    /// Start the render thread for this animator.
    pub fn spawn_render_thread(&self) -> Result<RenderThread> {
        RenderThread::spawn(Arc::clone(&self.shared))
    }

    /// Advance and composite one frame on the calling thread.
    pub fn render_once(&self) -> Result<FrameReport> {
        let mut scene = self.shared.lock()?;
        Ok(scene.step().clone())
    }

    /// Inspect the scene under the lock.
    pub fn with_scene<R>(&self, f: impl FnOnce(&Scene) -> R) -> Result<R> {
        let scene = self.shared.lock()?;
        Ok(f(&scene))
    }
}
