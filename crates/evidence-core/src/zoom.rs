//! Zoom gesture classification
//!
//! The wrapped viewer binds its own zoom shortcuts. The browser shell asks
//! these functions whether a raw keyboard or wheel event is one of them and
//! swallows it before the viewer sees it.

/// Keys that zoom when combined with the control-like modifier
const ZOOM_KEYS: &[&str] = &["+", "=", "-", "_", "0", ")"];

/// Numeric-pad codes, reported regardless of keyboard layout
const ZOOM_CODES: &[&str] = &["NumpadAdd", "NumpadSubtract", "Numpad0"];

/// Which modifiers count as "control-like" on the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierPolicy {
    /// Windows and Linux
    #[default]
    CtrlOnly,
    /// macOS: Cmd zooms as well as Ctrl
    CtrlOrMeta,
}

impl ModifierPolicy {
    /// Pick a policy from `navigator.platform`
    pub fn for_platform(platform: &str) -> Self {
        let platform = platform.to_ascii_lowercase();
        if platform.starts_with("mac") || platform.contains("iphone") || platform.contains("ipad") {
            Self::CtrlOrMeta
        } else {
            Self::CtrlOnly
        }
    }

    pub fn is_control_like(&self, ctrl: bool, meta: bool) -> bool {
        match self {
            Self::CtrlOnly => ctrl,
            Self::CtrlOrMeta => ctrl || meta,
        }
    }
}

/// The parts of a keyboard event the guard looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord<'a> {
    pub key: &'a str,
    pub code: &'a str,
    pub ctrl: bool,
    pub meta: bool,
}

pub fn is_zoom_shortcut(policy: ModifierPolicy, chord: &KeyChord<'_>) -> bool {
    policy.is_control_like(chord.ctrl, chord.meta)
        && (ZOOM_KEYS.contains(&chord.key) || ZOOM_CODES.contains(&chord.code))
}

pub fn is_zoom_wheel(policy: ModifierPolicy, ctrl: bool, meta: bool) -> bool {
    policy.is_control_like(ctrl, meta)
}
