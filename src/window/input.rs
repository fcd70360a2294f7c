use std::fmt;

use serde::Deserialize;

/// Keys the player reacts to.
///
/// Names are canonical: config strings and native key codes map to the same
/// value, so `"q"` in the config equals the key a backend reports for Q.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Key {
    F11,
    Escape,
    /// Upper-case name such as `"Q"`, `"7"`, `"F5"` or `"SPACE"`.
    Other(String),
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "F11" => Self::F11,
            "ESCAPE" | "ESC" => Self::Escape,
            "RETURN" => Self::Other("ENTER".to_string()),
            _ => Self::Other(upper),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F11 => f.write_str("F11"),
            Self::Escape => f.write_str("ESCAPE"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

impl Key {
    /// Whether some backend can report this key.
    pub fn is_supported(&self) -> bool {
        let name = match self {
            Self::F11 | Self::Escape => return true,
            Self::Other(name) => name.as_str(),
        };
        match name {
            "SPACE" | "ENTER" | "TAB" => true,
            _ if name.len() == 1 => name.chars().all(|c| c.is_ascii_alphanumeric()),
            _ => name
                .strip_prefix('F')
                .and_then(|n| n.parse::<u8>().ok())
                .is_some_and(|n| (1..=20).contains(&n)),
        }
    }

    /// Maps a Win32 virtual-key code.
    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn from_virtual_key(code: u16) -> Self {
        match code {
            0x09 => Self::from("TAB"),
            0x0D => Self::from("ENTER"),
            0x1B => Self::Escape,
            0x20 => Self::from("SPACE"),
            // 0-9 and A-Z share their ASCII codes
            0x30..=0x39 | 0x41..=0x5A => Self::Other(char::from(code as u8).to_string()),
            0x70..=0x83 => Self::from(format!("F{}", code - 0x70 + 1)),
            _ => Self::Other(format!("VK {:#04X}", code)),
        }
    }

    /// Maps a macOS virtual keycode (ANSI layout).
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub fn from_mac_keycode(code: u16) -> Self {
        let name = match code {
            0x00 => "A",
            0x01 => "S",
            0x02 => "D",
            0x03 => "F",
            0x04 => "H",
            0x05 => "G",
            0x06 => "Z",
            0x07 => "X",
            0x08 => "C",
            0x09 => "V",
            0x0B => "B",
            0x0C => "Q",
            0x0D => "W",
            0x0E => "E",
            0x0F => "R",
            0x10 => "Y",
            0x11 => "T",
            0x12 => "1",
            0x13 => "2",
            0x14 => "3",
            0x15 => "4",
            0x16 => "6",
            0x17 => "5",
            0x19 => "9",
            0x1A => "7",
            0x1C => "8",
            0x1D => "0",
            0x1F => "O",
            0x20 => "U",
            0x22 => "I",
            0x23 => "P",
            0x24 => "ENTER",
            0x25 => "L",
            0x26 => "J",
            0x28 => "K",
            0x2D => "N",
            0x2E => "M",
            0x30 => "TAB",
            0x31 => "SPACE",
            0x35 => "ESCAPE",
            0x7A => "F1",
            0x78 => "F2",
            0x63 => "F3",
            0x76 => "F4",
            0x60 => "F5",
            0x61 => "F6",
            0x62 => "F7",
            0x64 => "F8",
            0x65 => "F9",
            0x6D => "F10",
            0x67 => "F11",
            0x6F => "F12",
            0x69 => "F13",
            0x6B => "F14",
            0x71 => "F15",
            0x6A => "F16",
            0x40 => "F17",
            0x4F => "F18",
            0x50 => "F19",
            0x5A => "F20",
            _ => return Self::Other(format!("KEYCODE {:#04X}", code)),
        };
        Self::from(name)
    }
}

/// Native event source, drained once per tick on the main thread.
pub trait InputSource {
    /// Dispatches pending OS events and returns the keys pressed since the
    /// previous call. Also reports whether the OS asked the window to close.
    fn pump(&mut self) -> PumpResult;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PumpResult {
    pub keys: Vec<Key>,
    pub close_requested: bool,
}
