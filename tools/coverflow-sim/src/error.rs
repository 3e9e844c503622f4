use coverflow::AnimatorError;

/// All errors produced by coverflow-sim.
///
/// Variants are split into two categories:
/// - **Setup errors** (exit code 2): bad config, bad arguments, I/O failures
/// - **Runtime errors** (exit code 1): the animator failed while running
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    // ── Setup errors (exit code 2) ───────────────────────────────────

    #[error("Invalid screen size {width}x{height}")]
    ScreenSize { width: u32, height: u32 },

    #[error("Command script is empty")]
    EmptyScript,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // ── Runtime errors (exit code 1) ─────────────────────────────────

    #[error("Animator error: {0}")]
    Animator(#[from] AnimatorError),
}

impl SimError {
    /// Process exit code for this error.
    ///
    /// - `2`: setup error (bad arguments, config or I/O)
    /// - `1`: runtime failure inside the animator
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ScreenSize { .. }
            | Self::EmptyScript
            | Self::Io(_)
            | Self::Json(_)
            | Self::Image(_)
            | Self::Animator(AnimatorError::Config(_) | AnimatorError::Io(_)) => 2,

            Self::Animator(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
