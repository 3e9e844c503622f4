//! Interactive mode: render thread plus command tokens from stdin.

use std::io::{self, BufRead};
use std::path::Path;

use serde::Serialize;

use coverflow::{Animator, AnimatorConfig};

use crate::cli::RunArgs;
use crate::error::Result;
use crate::script::parse_script;
use crate::snapshot::prepare;

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub commands: usize,
    pub frames: u64,
    pub socket: Option<String>,
}

/// Run until stdin closes.
pub fn run(config: AnimatorConfig, args: &RunArgs) -> Result<RunOutput> {
    let socket = args.socket.clone().or_else(|| config.socket_path.clone());
    let animator = prepare(config, &args.scene)?;
    let render = animator.spawn_render_thread()?;

    if let Some(path) = &socket {
        serve_reservations(path, &animator)?;
    }

    let mut commands = 0;
    for line in io::stdin().lock().lines() {
        for token in parse_script(&line?) {
            animator.command(&token)?;
            commands += 1;
        }
    }

    let frames = animator.with_scene(|s| s.frames())?;
    render.shutdown()?;
    Ok(RunOutput {
        commands,
        frames,
        socket: socket.map(|p| p.display().to_string()),
    })
}

#[cfg(unix)]
fn serve_reservations(path: &Path, animator: &Animator) -> Result<()> {
    use coverflow::{AnimatorError, ReservationListener};

    let listener = ReservationListener::bind(path, animator.clone())?;
    std::thread::Builder::new()
        .name("coverflow-listener".into())
        .spawn(move || {
            if let Err(e) = listener.serve() {
                log::error!("[Coverflow Sim] Listener stopped: {}", e);
            }
        })
        .map_err(AnimatorError::ThreadSpawn)?;
    Ok(())
}

#[cfg(not(unix))]
fn serve_reservations(path: &Path, _animator: &Animator) -> Result<()> {
    log::warn!(
        "[Coverflow Sim] Unix sockets unavailable, ignoring {}",
        path.display()
    );
    Ok(())
}
