//! Abstract device interface (component C4).
//!
//! Concrete backends (uinput, Wayland virtual-pointer/keyboard protocols,
//! Hyprland's IPC) are out of scope for this crate; it only declares the
//! contract a backend must satisfy. Grounded on the shape of
//! `src/input_control/base.py`'s `MouseBackend`/`KeyboardBackend` split in
//! the original client, expressed as Rust traits rather than an ABC
//! hierarchy, and extended with the explicit `DeviceContext` position
//! bookkeeping the original kept ad hoc on the client object.

use std::collections::HashSet;

use crate::error::DeviceError;
use crate::keymap::EvdevCode;

/// Owns the screen geometry and this client's belief about where the
/// cursor sits in the server's coordinate space.
pub trait DeviceContext: Send {
    /// Current screen dimensions, in pixels.
    fn screen_size(&self) -> (u32, u32);

    /// The last position the client believes the cursor occupies, in
    /// server coordinates. `None` before the first `CINN` or `DMMV`.
    fn logical_pos(&self) -> Option<(i32, i32)>;

    /// Re-queries the windowing system for the current screen size.
    fn update_screen_info(&mut self) -> Result<(), DeviceError>;

    /// Reads the real cursor position from the backend and overwrites
    /// `logical_pos` with it, discarding any drift accumulated so far.
    fn sync_logical_to_real(&mut self) -> Result<(), DeviceError>;

    /// Returns the delta from `logical_pos` to `(x, y)`, updates
    /// `logical_pos` to `(x, y)`, and returns `(0, 0)` when there was no
    /// previous position to diff against.
    fn calculate_relative_move(&mut self, x: i32, y: i32) -> (i32, i32);
}

/// Pointer injection surface.
pub trait MouseDevice: Send {
    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), DeviceError>;

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DeviceError>;

    /// `code` is already an evdev `BTN_*` code (post-translation).
    fn send_button(&mut self, code: EvdevCode, pressed: bool) -> Result<(), DeviceError>;

    /// `clicks` carries sign only; see §9 design notes on discarded
    /// magnitude.
    fn wheel_relative(&mut self, clicks: i32) -> Result<(), DeviceError>;

    /// Releases every button this device believes is held down.
    fn release_all_button(&mut self) -> Result<(), DeviceError>;

    /// Commits buffered events to the backend.
    fn syn(&mut self) -> Result<(), DeviceError>;
}

/// Keyboard injection surface. Keys are addressed by their already-
/// translated evdev code, not by the server's key id or HID usage — the
/// translation (component C3) happens before a handler ever reaches the
/// device layer.
pub trait KeyboardDevice: Send {
    fn send_key(&mut self, code: EvdevCode, pressed: bool) -> Result<(), DeviceError>;

    /// Brings the local modifier state into agreement with `mask`:
    /// presses modifiers set in `mask` that aren't currently held, and
    /// releases held modifiers not set in `mask`.
    fn sync_modifiers(&mut self, mask: u16) -> Result<(), DeviceError>;

    /// Releases every key this device believes is held down and empties
    /// the pressed-keys set.
    fn release_all_key(&mut self) -> Result<(), DeviceError>;

    fn syn(&mut self) -> Result<(), DeviceError>;

    /// The evdev codes this device currently believes are pressed.
    fn pressed_keys(&self) -> &HashSet<EvdevCode>;
}
