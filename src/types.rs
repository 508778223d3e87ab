/*
 * Platform-agnostic value types passed between the dispatch core, the widgets,
 * and the native layer. Handles are opaque integers here; the Win32 backend
 * reinterprets them as HWND / WNDPROC / HFONT at its boundary.
 */

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Opaque identifier of one live native control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetHandle(pub usize);

impl WidgetHandle {
    pub const NULL: WidgetHandle = WidgetHandle(0);

    pub const fn raw(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Address of an event-handling routine (a window procedure on Win32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerRef(pub usize);

impl HandlerRef {
    /// Returned by the native "set handler" primitive both when no previous
    /// handler existed and when the call failed.
    pub const NULL: HandlerRef = HandlerRef(0);

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontHandle(pub usize);

/// One native event: code plus its two untyped arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub code: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub const fn new(code: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            code,
            wparam,
            lparam,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Native control classes that can be subclassed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlClass {
    Edit,
}

impl ControlClass {
    pub const fn class_name(self) -> &'static str {
        match self {
            ControlClass::Edit => "EDIT",
        }
    }
}

/// Which text-valued property a get/set round-trip addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextProperty {
    WindowText,
    CueBanner,
}

/// Everything the native layer needs to create one child control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCreateSpec {
    pub class: ControlClass,
    pub parent: WidgetHandle,
    pub ex_style: u32,
    pub style: u32,
    pub size: Size,
}

/// Axes along which a layout manager may resize a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutFlags(u8);

impl LayoutFlags {
    pub const SHRINK_HORIZONTAL: LayoutFlags = LayoutFlags(0x01);
    pub const GROW_HORIZONTAL: LayoutFlags = LayoutFlags(0x02);
    pub const SHRINK_VERTICAL: LayoutFlags = LayoutFlags(0x04);
    pub const GROW_VERTICAL: LayoutFlags = LayoutFlags(0x08);

    pub const fn empty() -> Self {
        LayoutFlags(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: LayoutFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LayoutFlags {
    type Output = LayoutFlags;

    fn bitor(self, rhs: LayoutFlags) -> LayoutFlags {
        LayoutFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayoutFlags {
    fn bitor_assign(&mut self, rhs: LayoutFlags) {
        self.0 |= rhs.0;
    }
}

/*
 * Integer `a * b / c` rounded half away from zero, computed in 64 bits.
 * Matches the Win32 `MulDiv` contract, including -1 for a zero divisor.
 */
pub fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    if c == 0 {
        return -1;
    }
    let num = a as i64 * b as i64;
    let den = c as i64;
    let magnitude = (num.abs() + den.abs() / 2) / den.abs();
    let rounded = if (num < 0) != (den < 0) {
        -magnitude
    } else {
        magnitude
    };
    rounded.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Converts dialog units to pixels using the given dialog base units.
pub fn dialog_units_to_pixels(units: Size, base: Size) -> Size {
    Size {
        width: mul_div(units.width, base.width, 4),
        height: mul_div(units.height, base.height, 8),
    }
}

/// Crate-wide settings held by the toolkit context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitConfig {
    /// Capacity in UTF-16 units (terminator included) of the buffer used to
    /// read the cue banner back. Longer banners are truncated on read.
    pub cue_banner_capacity: usize,
    /// Whether newly created controls receive the native default GUI font.
    pub apply_default_font: bool,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            cue_banner_capacity: 128,
            apply_default_font: true,
        }
    }
}

/// Optional initial state applied while a line edit is being constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditOptions {
    pub text: Option<String>,
    pub cue_banner: Option<String>,
    pub read_only: bool,
    pub max_length: Option<usize>,
}

/*
 * UTF-16 helpers for the text round-trips. The native layer always receives
 * null-terminated buffers and returns text up to the first null.
 */
pub(crate) fn to_wide_null(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

pub(crate) fn from_wide_null(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}
