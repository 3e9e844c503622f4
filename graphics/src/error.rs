//! Animator error types

use std::io;

/// All errors produced by the animator and its collaborators.
///
/// Variants are split into two categories:
/// - **Setup errors**: bad framebuffer handles, bad configuration, thread spawn
/// - **Runtime errors**: upscale requests, poisoned state, protocol input
#[derive(thiserror::Error, Debug)]
pub enum AnimatorError {
    // ── Setup errors ─────────────────────────────────────────────────

    #[error("Framebuffer pointer is null or not 2-byte aligned")]
    InvalidFramebuffer,

    #[error("Framebuffer stride of {stride} bytes cannot hold {width} pixels per row")]
    InvalidStride { stride: usize, width: u32 },

    #[error("Pixel buffer size mismatch: expected at least {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Config parse error: {0}")]
    Config(String),

    #[error("Failed to spawn render thread: {0}")]
    ThreadSpawn(#[source] io::Error),

    #[error("Scheduling policy change failed: {0}")]
    Scheduling(#[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // ── Runtime errors ───────────────────────────────────────────────

    #[error("Upscaling is not supported: {src_width}x{src_height} -> {dst_width}x{dst_height}")]
    Upscale {
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    },

    #[error("Scene lock poisoned")]
    LockPoisoned,

    #[error("Render thread panicked")]
    RenderThreadPanicked,

    #[error("Malformed reservation request: {0}")]
    Protocol(String),
}

/// Result type for animator operations
pub type Result<T> = core::result::Result<T, AnimatorError>;
