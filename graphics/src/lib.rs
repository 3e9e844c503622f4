//! Coverflow Screen Animator
//!
//! This crate owns the framebuffer of an embedded device's windowing layer.
//! It tracks client windows, animates them between a full-screen
//! "focused" layout and a shrunk, pageable "overview" layout, and paints
//! every frame in software, including a mirrored reflection below a fixed
//! screen row.
//!
//! # Architecture
//!
//! The animator is organized into:
//!
//! - `window`: Window registry, z-order and captions
//! - `reserved`: Screen areas owned by out-of-process renderers
//! - `layout`: Overview and focused destinations, paging order
//! - `animation`: Fixed-step interpolation, paging and cancellation
//! - `compositor`: Exposure tracking, stretch blit, reflection and fill
//! - `scene`: Event dispatch over all of the above
//! - `animator`: Shared, lock-protected handle used by event sources
//! - `render`: Render thread with scheduling-policy switching
//! - `listener`: Unix socket protocol for reserved regions
//!
//! # Example
//!
//! ```no_run
//! use coverflow::{Animator, AnimatorConfig, Framebuffer};
//!
//! let animator = Animator::new(Framebuffer::new(800, 480), AnimatorConfig::default())?;
//! let render = animator.spawn_render_thread()?;
//! animator.command("go()")?;
//! render.shutdown()?;
//! # Ok::<(), coverflow::AnimatorError>(())
//! ```

pub mod animation;
pub mod animator;
pub mod blit;
pub mod compositor;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod layout;
#[cfg(unix)]
pub mod listener;
pub mod render;
pub mod reserved;
pub mod scene;
pub mod sched;
pub mod surface;
pub mod window;

pub use animation::{interpolate, AnimationEngine, PanDirection};
pub use animator::Animator;
pub use compositor::{Compositor, FrameReport};
pub use config::AnimatorConfig;
pub use error::{AnimatorError, Result};
pub use framebuffer::Framebuffer;
pub use geometry::{Rect, Region};
pub use layout::{LayoutEngine, LayoutMode, LayoutOrder};
#[cfg(unix)]
pub use listener::ReservationListener;
pub use render::RenderThread;
pub use reserved::{ReservationId, ReservedRegionTracker};
pub use scene::{Command, Event, Scene, WindowEvent};
pub use sched::SchedulingPolicy;
pub use surface::{Pixel, PixelBuffer, PixelFormat, WindowImage};
pub use window::{WindowId, WindowRegistry};
