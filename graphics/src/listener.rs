//! Reserved-region listener.
//!
//! Out-of-process renderers (video overlays and the like) connect to a
//! local stream socket and register the rectangle they draw into:
//!
//! ```text
//! peer -> server   x: u32, y: u32, width: u32, height: u32   (native endian)
//! server -> peer   0x01                                     (acknowledged)
//! ```
//!
//! A later request on the same connection replaces the rectangle; closing
//! the connection releases it. A malformed request closes the connection.

use std::io::{self, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crate::animator::Animator;
use crate::error::{AnimatorError, Result};
use crate::geometry::Rect;
use crate::reserved::ReservationId;

/// Acknowledgement byte sent after each accepted request.
pub const ACK: u8 = 1;
/// Size of one registration request in bytes.
pub const REQUEST_LEN: usize = 16;

/// Connection ids live above anything a window id is likely to use.
const FIRST_CONNECTION_ID: u64 = 1 << 32;

/// Decode one registration request.
pub fn decode_request(bytes: &[u8; REQUEST_LEN]) -> Result<Rect> {
    let mut fields = [0u32; 4];
    for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(chunk);
        *field = u32::from_ne_bytes(raw);
    }
    let [x, y, width, height] = fields;

    if width == 0 || height == 0 {
        return Err(AnimatorError::Protocol(format!(
            "empty rectangle {}x{}",
            width, height
        )));
    }
    let in_range = |origin: u32, extent: u32| {
        i32::try_from(origin)
            .ok()
            .zip(i32::try_from(extent).ok())
            .is_some_and(|(o, e)| o.checked_add(e).is_some())
    };
    if !in_range(x, width) || !in_range(y, height) {
        return Err(AnimatorError::Protocol(format!(
            "rectangle {},{} {}x{} out of range",
            x, y, width, height
        )));
    }
    Ok(Rect::new(x as i32, y as i32, width, height))
}

/// Encode a registration request, as a peer would send it.
pub fn encode_request(rect: Rect) -> [u8; REQUEST_LEN] {
    let mut bytes = [0u8; REQUEST_LEN];
    let fields = [rect.x as u32, rect.y as u32, rect.width, rect.height];
    for (chunk, field) in bytes.chunks_exact_mut(4).zip(fields) {
        chunk.copy_from_slice(&field.to_ne_bytes());
    }
    bytes
}

/// Accepts reservation peers on a Unix socket.
#[derive(Debug)]
pub struct ReservationListener {
    listener: UnixListener,
    path: PathBuf,
    animator: Animator,
    next_id: AtomicU64,
}

impl ReservationListener {
    /// Bind `path`, replacing a stale socket file left behind by an earlier
    /// run.
    pub fn bind(path: impl AsRef<Path>, animator: Animator) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match std::fs::remove_file(&path) {
            Ok(()) => log::debug!("[Coverflow Listener] Removed stale socket {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let listener = UnixListener::bind(&path)?;
        log::info!("[Coverflow Listener] Listening on {}", path.display());
        Ok(ReservationListener {
            listener,
            path,
            animator,
            next_id: AtomicU64::new(FIRST_CONNECTION_ID),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept connections forever, one thread per peer.
    pub fn serve(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("[Coverflow Listener] Accept failed: {}", e);
                    continue;
                }
            };
            let id = ReservationId(self.next_id.fetch_add(1, Ordering::Relaxed));
            let animator = self.animator.clone();
            thread::Builder::new()
                .name(format!("coverflow-reserve-{}", id.0 - FIRST_CONNECTION_ID))
                .spawn(move || {
                    if let Err(e) = handle_connection(stream, id, &animator) {
                        log::warn!("[Coverflow Listener] {:?} closed: {}", id, e);
                    }
                })
                .map_err(AnimatorError::ThreadSpawn)?;
        }
        Ok(())
    }
}

impl Drop for ReservationListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Serve one peer until it disconnects or misbehaves, then release its
/// reservation.
pub fn handle_connection(mut stream: UnixStream, id: ReservationId, animator: &Animator) -> Result<()> {
    log::debug!("[Coverflow Listener] {:?} connected", id);
    let mut registered = false;
    let mut request = [0u8; REQUEST_LEN];

    let outcome = loop {
        match stream.read_exact(&mut request) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break Ok(()),
            Err(e) => break Err(AnimatorError::Io(e)),
        }
        let rect = match decode_request(&request) {
            Ok(rect) => rect,
            Err(e) => break Err(e),
        };
        if let Err(e) = animator.add_reserved(id, rect) {
            break Err(e);
        }
        registered = true;
        if let Err(e) = stream.write_all(&[ACK]) {
            break Err(AnimatorError::Io(e));
        }
    };

    if registered {
        animator.remove_reserved(id)?;
    }
    log::debug!("[Coverflow Listener] {:?} disconnected", id);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_request() {
        let rect = Rect::new(10, 20, 300, 200);
        assert_eq!(decode_request(&encode_request(rect)).unwrap(), rect);
    }

    #[test]
    fn test_decode_rejects_empty_and_out_of_range() {
        let empty = encode_request(Rect::new(0, 0, 0, 10));
        assert!(matches!(decode_request(&empty), Err(AnimatorError::Protocol(_))));

        let mut huge = encode_request(Rect::new(0, 0, 10, 10));
        huge[..4].copy_from_slice(&u32::MAX.to_ne_bytes());
        assert!(matches!(decode_request(&huge), Err(AnimatorError::Protocol(_))));

        let overflow = encode_request(Rect::new(i32::MAX - 5, 0, 10, 10));
        assert!(decode_request(&overflow).is_err());
    }
}
