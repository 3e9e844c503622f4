//! Deterministic replay: `snapshot --script <tokens> --out <png>`.

use serde::Serialize;

use coverflow::{Animator, AnimatorConfig, Framebuffer, LayoutMode, Rect};

use crate::cli::{SceneArgs, SnapshotArgs};
use crate::error::{Result, SimError};
use crate::script::parse_script;
use crate::synth;

#[derive(Debug, Serialize)]
pub struct SnapshotOutput {
    pub output: String,
    pub commands: usize,
    pub frames: u64,
    pub mode: String,
    pub order: Vec<u64>,
    pub focus_index: Option<usize>,
    /// Windows skipped in the last frame because they would need
    /// upscaling.
    pub rejected: Vec<u64>,
}

/// Build an animator with the synthetic window set described by `args`.
pub fn prepare(config: AnimatorConfig, args: &SceneArgs) -> Result<Animator> {
    if args.width == 0 || args.height == 0 {
        return Err(SimError::ScreenSize {
            width: args.width,
            height: args.height,
        });
    }
    let decoration = args
        .decoration
        .then(|| config.decoration_caption.clone());
    let screen = Rect::new(0, 0, args.width, args.height);
    let animator = Animator::new(Framebuffer::new(args.width, args.height), config)?;
    synth::load(&animator, synth::window_set(screen, args.windows, decoration.as_deref())?)?;
    Ok(animator)
}

/// Replay the script on the calling thread and write the final frame.
pub fn snapshot(config: AnimatorConfig, args: &SnapshotArgs) -> Result<SnapshotOutput> {
    let tokens = parse_script(&args.script);
    if tokens.is_empty() {
        return Err(SimError::EmptyScript);
    }
    let animator = prepare(config, &args.scene)?;
    let mut last = animator.render_once()?;

    for token in &tokens {
        animator.command(token)?;
        let mut rendered = 0u32;
        loop {
            last = animator.render_once()?;
            rendered += 1;
            let animating = animator.with_scene(|s| s.is_animating())?;
            let budget_spent = args.frames.is_some_and(|limit| rendered >= limit);
            if !animating || budget_spent {
                break;
            }
        }
        log::debug!("[Coverflow Sim] {} -> {} frames", token, rendered);
    }

    let (image, frames, mode, order, focus_index) = animator.with_scene(|s| {
        let layout = s.layout();
        (
            synth::capture(s.framebuffer()),
            s.frames(),
            layout.mode(),
            layout.order().ids().iter().map(|id| id.0).collect::<Vec<_>>(),
            layout.order().focus_index(),
        )
    })?;
    image.save(&args.out)?;
    log::info!("[Coverflow Sim] Wrote {}", args.out.display());

    Ok(SnapshotOutput {
        output: args.out.display().to_string(),
        commands: tokens.len(),
        frames,
        mode: match mode {
            LayoutMode::Focused => "focused",
            LayoutMode::Overview => "overview",
        }
        .to_string(),
        order,
        focus_index,
        rejected: last.rejected.iter().map(|id| id.0).collect(),
    })
}
