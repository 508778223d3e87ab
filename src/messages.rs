// ── Native message and style constants ───────────────────────────────────────
//
// Values mirror WinUser.h / CommCtrl.h. They are kept as plain integers so the
// dispatch core and its tests build on every platform; the Win32 backend
// converts them to the `windows` crate newtypes at the boundary.

// ── Window messages ──────────────────────────────────────────────────────────

/// Replace the control's window text.  LPARAM = null-terminated UTF-16 string.
pub const WM_SETTEXT: u32 = 0x000C;
/// Copy the window text.  WPARAM = buffer len (incl. null); LPARAM = buffer ptr.
pub const WM_GETTEXT: u32 = 0x000D;
/// Length of the window text in UTF-16 units, terminator excluded.
pub const WM_GETTEXTLENGTH: u32 = 0x000E;
/// Set the control font.  WPARAM = HFONT; LPARAM = redraw flag.
pub const WM_SETFONT: u32 = 0x0030;
/// Last message a window receives before its handle is freed.
pub const WM_NCDESTROY: u32 = 0x0082;
/// Dialog manager asks which keys the control wants.  WPARAM = virtual key.
pub const WM_GETDLGCODE: u32 = 0x0087;

// ── Edit control messages ────────────────────────────────────────────────────

/// Limit the text length.  WPARAM = max characters (0 = platform maximum).
pub const EM_LIMITTEXT: u32 = 0x00C5;
/// Toggle read-only.  WPARAM = TRUE/FALSE.
pub const EM_SETREADONLY: u32 = 0x00CF;
/// Set the cue banner.  WPARAM = show-while-focused; LPARAM = UTF-16 string.
pub const EM_SETCUEBANNER: u32 = 0x1501;
/// Copy the cue banner.  WPARAM = buffer ptr; LPARAM = buffer len.
pub const EM_GETCUEBANNER: u32 = 0x1502;

// ── Keys and dialog codes ────────────────────────────────────────────────────

pub const VK_RETURN: usize = 0x0D;
/// `WM_GETDLGCODE` result: the control processes every key itself.
pub const DLGC_WANTALLKEYS: isize = 0x0004;

// ── Styles ───────────────────────────────────────────────────────────────────

pub const WS_EX_CLIENTEDGE: u32 = 0x0000_0200;
pub const WS_CHILD: u32 = 0x4000_0000;
pub const WS_VISIBLE: u32 = 0x1000_0000;
pub const WS_TABSTOP: u32 = 0x0001_0000;
pub const ES_AUTOHSCROLL: u32 = 0x0080;

// ── Return values ────────────────────────────────────────────────────────────

pub const FALSE: isize = 0;
pub const TRUE: isize = 1;
