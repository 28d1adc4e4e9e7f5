//! Demo device backend that logs every injected event instead of touching
//! real input devices. The core only defines `DeviceContext`/`MouseDevice`/
//! `KeyboardDevice` (§6.2); concrete uinput/Wayland/Hyprland backends are
//! out of scope, so the binary ships this one to make the client runnable
//! and testable end to end without root or a compositor.

use std::collections::HashSet;

use deskflow_client_lib::device::{DeviceContext, KeyboardDevice, MouseDevice};
use deskflow_client_lib::error::DeviceError;
use deskflow_client_lib::keymap::EvdevCode;
use tracing::info;

pub struct LoggingContext {
    screen_size: (u32, u32),
    logical_pos: Option<(i32, i32)>,
}

impl LoggingContext {
    pub fn new(screen_size: (u32, u32)) -> Self {
        Self { screen_size, logical_pos: None }
    }
}

impl DeviceContext for LoggingContext {
    fn screen_size(&self) -> (u32, u32) {
        self.screen_size
    }

    fn logical_pos(&self) -> Option<(i32, i32)> {
        self.logical_pos
    }

    fn update_screen_info(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn sync_logical_to_real(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn calculate_relative_move(&mut self, x: i32, y: i32) -> (i32, i32) {
        let delta = match self.logical_pos {
            Some((px, py)) => (x - px, y - py),
            None => (0, 0),
        };
        self.logical_pos = Some((x, y));
        delta
    }
}

#[derive(Default)]
pub struct LoggingMouse {
    pressed: HashSet<EvdevCode>,
}

impl MouseDevice for LoggingMouse {
    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), DeviceError> {
        info!(x, y, "move_absolute");
        Ok(())
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DeviceError> {
        info!(dx, dy, "move_relative");
        Ok(())
    }

    fn send_button(&mut self, code: EvdevCode, pressed: bool) -> Result<(), DeviceError> {
        info!(code, pressed, "send_button");
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
        Ok(())
    }

    fn wheel_relative(&mut self, clicks: i32) -> Result<(), DeviceError> {
        info!(clicks, "wheel_relative");
        Ok(())
    }

    fn release_all_button(&mut self) -> Result<(), DeviceError> {
        info!(count = self.pressed.len(), "release_all_button");
        self.pressed.clear();
        Ok(())
    }

    fn syn(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct LoggingKeyboard {
    pressed: HashSet<EvdevCode>,
}

impl KeyboardDevice for LoggingKeyboard {
    fn send_key(&mut self, code: EvdevCode, pressed: bool) -> Result<(), DeviceError> {
        info!(code, pressed, "send_key");
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
        Ok(())
    }

    fn sync_modifiers(&mut self, mask: u16) -> Result<(), DeviceError> {
        info!(mask, "sync_modifiers");
        Ok(())
    }

    fn release_all_key(&mut self) -> Result<(), DeviceError> {
        info!(count = self.pressed.len(), "release_all_key");
        self.pressed.clear();
        Ok(())
    }

    fn syn(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn pressed_keys(&self) -> &HashSet<EvdevCode> {
        &self.pressed
    }
}
