use crate::error::{ReplayError, Result};

use std::panic::Location;

use enigo::{Button, Key};
use error_location::ErrorLocation;

/// A single captured input action to be replayed.
///
/// Immutable once captured; a new capture replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedAction {
    /// A mouse button press.
    MouseButton {
        /// Button identifier as reported by the global listener
        /// ("Left", "Right", "Middle").
        button: String,
    },
    /// A non-printable key press.
    KeyboardKey {
        /// Key identifier as reported by the global listener
        /// (e.g. "Return", "F5").
        key: String,
    },
    /// A printable character key press.
    KeyboardChar {
        /// The character the key produced.
        ch: char,
    },
}

impl Default for CapturedAction {
    /// Left mouse click. A replayable default exists before the first capture.
    fn default() -> Self {
        Self::MouseButton {
            button: "Left".to_owned(),
        }
    }
}

impl CapturedAction {
    /// Capture-result kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MouseButton { .. } => "mouse",
            Self::KeyboardKey { .. } => "keyboard_key",
            Self::KeyboardChar { .. } => "keyboard_char",
        }
    }

    /// Capture-result value.
    pub fn value(&self) -> String {
        match self {
            Self::MouseButton { button } => button.clone(),
            Self::KeyboardKey { key } => key.clone(),
            Self::KeyboardChar { ch } => ch.to_string(),
        }
    }

    /// Human-readable display name for the capture label.
    pub fn label(&self) -> String {
        match self {
            Self::MouseButton { button } => format!("Mouse: {button}"),
            Self::KeyboardKey { key } => format!("Special key: {key}"),
            Self::KeyboardChar { ch } => format!("Key: {ch}"),
        }
    }

    /// Map the captured data to the concrete input the injector synthesizes.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::UnrecognizedAction`] when the captured data
    /// does not correspond to a synthesizable input.
    #[track_caller]
    pub fn resolve(&self) -> Result<ResolvedAction> {
        match self {
            Self::MouseButton { button } => resolve_button(button).map(ResolvedAction::Button),
            Self::KeyboardKey { key } => resolve_key(key).map(ResolvedAction::Key),
            Self::KeyboardChar { ch } => Ok(ResolvedAction::Key(Key::Unicode(*ch))),
        }
    }
}

/// A captured action resolved to a concrete synthesizable input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedAction {
    /// A mouse button click.
    Button(Button),
    /// A key tap.
    Key(Key),
}

#[track_caller]
fn resolve_button(button: &str) -> Result<Button> {
    match button {
        "Left" => Ok(Button::Left),
        "Right" => Ok(Button::Right),
        "Middle" => Ok(Button::Middle),
        other => Err(ReplayError::UnrecognizedAction {
            detail: format!("mouse button {other:?}"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Non-printable keys supported on every platform the injector runs on.
#[track_caller]
fn resolve_key(key: &str) -> Result<Key> {
    let resolved = match key {
        "Alt" => Key::Alt,
        "Backspace" => Key::Backspace,
        "CapsLock" => Key::CapsLock,
        "ControlLeft" | "ControlRight" => Key::Control,
        "Delete" => Key::Delete,
        "DownArrow" => Key::DownArrow,
        "End" => Key::End,
        "Escape" => Key::Escape,
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,
        "Home" => Key::Home,
        "LeftArrow" => Key::LeftArrow,
        "MetaLeft" | "MetaRight" => Key::Meta,
        "PageDown" => Key::PageDown,
        "PageUp" => Key::PageUp,
        "Return" => Key::Return,
        "RightArrow" => Key::RightArrow,
        "ShiftLeft" | "ShiftRight" => Key::Shift,
        "Space" => Key::Space,
        "Tab" => Key::Tab,
        "UpArrow" => Key::UpArrow,
        other => {
            return Err(ReplayError::UnrecognizedAction {
                detail: format!("key {other:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    Ok(resolved)
}
