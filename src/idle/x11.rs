//! X11 idle time via the MIT-SCREEN-SAVER extension.

use tracing::debug;
use tracing::info;
use x11rb::connection::Connection;
use x11rb::connection::RequestConnection;
use x11rb::protocol::screensaver;
use x11rb::protocol::screensaver::ConnectionExt as _;
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use super::IdleError;
use super::IdleSource;
use crate::domain::IdleReading;

/// Open connection to an X11 display, queried for idle time.
///
/// The connection is released on drop; `close` makes the release explicit.
pub struct X11IdleSource {
    conn: RustConnection,
    root: Window,
}

impl X11IdleSource {
    /// Connect to the display named by `DISPLAY`.
    pub fn open() -> Result<Self, IdleError> {
        Self::open_display(None)
    }

    /// Connect to the given display, or to `DISPLAY` when `None`.
    pub fn open_display(display: Option<&str>) -> Result<Self, IdleError> {
        let (conn, screen_num) = RustConnection::connect(display)
            .map_err(|e| IdleError::ConnectionFailed(e.to_string()))?;

        let extension = conn
            .extension_information(screensaver::X11_EXTENSION_NAME)
            .map_err(|e| IdleError::QueryFailed(e.to_string()))?;
        if extension.is_none() {
            return Err(IdleError::ExtensionMissing);
        }

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| {
                IdleError::ConnectionFailed(format!("Screen {screen_num} not found"))
            })?;

        info!("Connected to X11 display (screen {})", screen_num);

        Ok(Self { conn, root })
    }

    /// Release the display connection.
    pub fn close(self) {
        drop(self);
    }
}

impl IdleSource for X11IdleSource {
    fn query(&mut self) -> Result<IdleReading, IdleError> {
        let reply = self
            .conn
            .screensaver_query_info(self.root)
            .map_err(|e| IdleError::QueryFailed(e.to_string()))?
            .reply()
            .map_err(|e| IdleError::QueryFailed(e.to_string()))?;

        Ok(IdleReading::from_millis(u64::from(reply.ms_since_user_input)))
    }
}

impl Drop for X11IdleSource {
    fn drop(&mut self) {
        debug!("Closing X11 display connection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_malformed_display_fails() {
        let result = X11IdleSource::open_display(Some("not a display"));
        assert!(matches!(result, Err(IdleError::ConnectionFailed(_))));
    }

    #[test]
    fn test_open_missing_display_fails() {
        let result = X11IdleSource::open_display(Some(":4242"));
        assert!(matches!(result, Err(IdleError::ConnectionFailed(_))));
    }
}
