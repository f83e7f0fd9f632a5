//! Chat input affordances: submit key handling and auto-grow

/// Maximum height of the chat input before it scrolls internally
pub const INPUT_MAX_HEIGHT_PX: u32 = 120;

/// Keys the chat input reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn enter(shift: bool) -> Self {
        Self {
            key: Key::Enter,
            shift,
        }
    }
}

/// What the input should do with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Send the message and suppress the default newline
    Send,
    /// Insert a literal line break
    InsertNewline,
    /// Let the input handle the key
    Default,
}

pub fn classify(press: KeyPress) -> KeyAction {
    match press {
        KeyPress {
            key: Key::Enter,
            shift: false,
        } => KeyAction::Send,
        KeyPress {
            key: Key::Enter,
            shift: true,
        } => KeyAction::InsertNewline,
        _ => KeyAction::Default,
    }
}

/// Height the input should take for its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoGrow {
    pub height_px: u32,
    /// Content is taller than the cap and scrolls inside the input
    pub scrolls: bool,
}

pub fn auto_grow(scroll_height_px: u32) -> AutoGrow {
    AutoGrow {
        height_px: scroll_height_px.min(INPUT_MAX_HEIGHT_PX),
        scrolls: scroll_height_px > INPUT_MAX_HEIGHT_PX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_sends_shift_enter_breaks_line() {
        assert_eq!(classify(KeyPress::enter(false)), KeyAction::Send);
        assert_eq!(classify(KeyPress::enter(true)), KeyAction::InsertNewline);
        assert_eq!(
            classify(KeyPress {
                key: Key::Other,
                shift: false
            }),
            KeyAction::Default
        );
    }

    #[test]
    fn test_auto_grow_caps_height() {
        assert_eq!(
            auto_grow(48),
            AutoGrow {
                height_px: 48,
                scrolls: false
            }
        );
        assert!(!auto_grow(120).scrolls);
        assert_eq!(
            auto_grow(300),
            AutoGrow {
                height_px: 120,
                scrolls: true
            }
        );
    }
}
