/*
 * Win32 implementation of `NativeApi`, plus the `extern "system"` interception
 * routines the OS calls for subclassed controls.
 *
 * A window procedure only receives the HWND, so each interception routine
 * finds its toolkit through a thread-local installed by `install_dispatcher`.
 * The slot holds a weak reference; when no toolkit is reachable the event goes
 * straight to the class's default window procedure.
 */

use crate::messages::{EM_GETCUEBANNER, EM_SETCUEBANNER, WM_GETTEXT, WM_SETTEXT};
use crate::native::NativeApi;
use crate::toolkit::{Toolkit, WeakToolkit};
use crate::types::{
    ControlClass, ControlCreateSpec, FontHandle, HandlerRef, Message, Size, TextProperty,
    ToolkitConfig, WidgetHandle,
};

use std::cell::RefCell;
use std::rc::Rc;

use windows::Win32::{
    Foundation::{
        GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, SIZE, SetLastError, WIN32_ERROR, WPARAM,
    },
    Graphics::Gdi::{
        DEFAULT_GUI_FONT, GetDC, GetStockObject, GetTextExtentPoint32W, GetTextMetricsW, HGDIOBJ,
        ReleaseDC, SelectObject, TEXTMETRICW,
    },
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::{
        CallWindowProcW, CreateWindowExW, DefWindowProcW, DestroyWindow, GWLP_WNDPROC,
        GetClassInfoExW, GetDialogBaseUnits, SendMessageW, SetWindowLongPtrW, WINDOW_EX_STYLE,
        WINDOW_STYLE, WM_GETFONT, WNDCLASSEXW, WNDPROC,
    },
};
use windows::core::{PCWSTR, w};

/// Sample text for average character width (52 letters, as dialog templates measure it).
const AVERAGE_WIDTH_SAMPLE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

thread_local! {
    static DISPATCHER: RefCell<Option<WeakToolkit>> = const { RefCell::new(None) };
}

/// Makes `toolkit` the target of interception routines running on this thread.
pub fn install_dispatcher(toolkit: &Toolkit) {
    DISPATCHER.with(|slot| *slot.borrow_mut() = Some(toolkit.downgrade()));
}

fn current_toolkit() -> Option<Toolkit> {
    DISPATCHER.with(|slot| slot.borrow().as_ref().and_then(WeakToolkit::upgrade))
}

fn class_name(class: ControlClass) -> PCWSTR {
    match class {
        ControlClass::Edit => w!("EDIT"),
    }
}

fn hwnd(handle: WidgetHandle) -> HWND {
    HWND(handle.raw() as *mut _)
}

fn class_default_proc(class: ControlClass) -> WNDPROC {
    let mut wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        ..Default::default()
    };
    match unsafe { GetClassInfoExW(None, class_name(class), &mut wc) } {
        Ok(()) => wc.lpfnWndProc,
        Err(err) => {
            log::error!(
                "Win32Native: GetClassInfoExW({}) failed: {err:?}",
                class.class_name()
            );
            None
        }
    }
}

/*
 * Interception routine for EDIT controls. Installed as the window procedure
 * of every subclassed line edit.
 */
unsafe extern "system" fn edit_interception_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let handle = WidgetHandle(hwnd.0 as usize);
    match current_toolkit() {
        Some(toolkit) => LRESULT(toolkit.dispatch(
            ControlClass::Edit,
            handle,
            Message::new(msg, wparam.0, lparam.0),
        )),
        None => unsafe {
            match class_default_proc(ControlClass::Edit) {
                Some(proc) => CallWindowProcW(Some(proc), hwnd, msg, wparam, lparam),
                None => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        },
    }
}

#[derive(Debug, Default)]
pub struct Win32Native {
    h_instance: Option<HINSTANCE>,
}

impl Win32Native {
    /*
     * The bare backend. Interception routines only reach a toolkit that was
     * passed to `install_dispatcher`. A toolkit built from this without that
     * call never sees an event: subclassed controls fall through to the EDIT
     * class procedure and the Return override never fires.
     * `Win32Native::toolkit` does both.
     */
    pub fn new() -> Self {
        let h_instance = unsafe { GetModuleHandleW(None) }
            .map(|module| HINSTANCE(module.0))
            .ok();
        Self { h_instance }
    }

    /// Creates a toolkit backed by Win32 and routes this thread's events to it.
    pub fn toolkit(config: ToolkitConfig) -> Toolkit {
        let toolkit = Toolkit::with_config(Rc::new(Win32Native::new()), config);
        install_dispatcher(&toolkit);
        toolkit
    }

    /*
     * Average character width and height of the control's current font, the
     * basis of dialog-unit conversion. Falls back to the system dialog base
     * units when the control has no font or measuring fails.
     */
    fn measure_font(&self, handle: WidgetHandle) -> Option<Size> {
        unsafe {
            let window = hwnd(handle);
            let font = SendMessageW(window, WM_GETFONT, None, None);
            if font.0 == 0 {
                return None;
            }
            let hdc = GetDC(Some(window));
            if hdc.is_invalid() {
                return None;
            }
            let previous = SelectObject(hdc, HGDIOBJ(font.0 as *mut _));

            let mut metrics = TEXTMETRICW::default();
            let mut extent = SIZE::default();
            let sample: Vec<u16> = AVERAGE_WIDTH_SAMPLE.encode_utf16().collect();
            let measured = GetTextMetricsW(hdc, &mut metrics).as_bool()
                && GetTextExtentPoint32W(hdc, &sample, &mut extent).as_bool();

            let _ = SelectObject(hdc, previous);
            let _ = ReleaseDC(Some(window), hdc);

            if !measured {
                return None;
            }
            let count = sample.len() as i32;
            Some(Size::new(
                (extent.cx / (count / 2) + 1) / 2,
                metrics.tmHeight,
            ))
        }
    }
}

impl NativeApi for Win32Native {
    fn create_control(&self, spec: &ControlCreateSpec) -> Option<WidgetHandle> {
        let result = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(spec.ex_style),
                class_name(spec.class),
                None,
                WINDOW_STYLE(spec.style),
                0,
                0,
                spec.size.width,
                spec.size.height,
                Some(hwnd(spec.parent)),
                None,
                self.h_instance,
                None,
            )
        };
        match result {
            Ok(created) if !created.is_invalid() => Some(WidgetHandle(created.0 as usize)),
            Ok(_) => None,
            Err(err) => {
                log::error!("Win32Native: CreateWindowExW failed: {err:?}");
                None
            }
        }
    }

    fn destroy_control(&self, handle: WidgetHandle) -> bool {
        match unsafe { DestroyWindow(hwnd(handle)) } {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Win32Native: DestroyWindow({handle}) failed: {err:?}");
                false
            }
        }
    }

    fn set_event_handler(&self, handle: WidgetHandle, handler: HandlerRef) -> HandlerRef {
        unsafe {
            // Cleared so a zero result can be told apart in the logged error code.
            SetLastError(WIN32_ERROR(0));
            let previous = SetWindowLongPtrW(hwnd(handle), GWLP_WNDPROC, handler.0 as isize);
            HandlerRef(previous as usize)
        }
    }

    fn call_handler(&self, handler: HandlerRef, handle: WidgetHandle, message: Message) -> isize {
        unsafe {
            let proc: WNDPROC = std::mem::transmute::<usize, WNDPROC>(handler.0);
            let result = match proc {
                Some(_) => CallWindowProcW(
                    proc,
                    hwnd(handle),
                    message.code,
                    WPARAM(message.wparam),
                    LPARAM(message.lparam),
                ),
                None => DefWindowProcW(
                    hwnd(handle),
                    message.code,
                    WPARAM(message.wparam),
                    LPARAM(message.lparam),
                ),
            };
            result.0
        }
    }

    fn class_default_handler(&self, class: ControlClass) -> HandlerRef {
        HandlerRef(class_default_proc(class).map_or(0, |proc| proc as usize))
    }

    #[allow(clippy::fn_to_numeric_cast)]
    fn interception_routine(&self, class: ControlClass) -> HandlerRef {
        match class {
            ControlClass::Edit => HandlerRef(edit_interception_proc as usize),
        }
    }

    fn send_message(&self, handle: WidgetHandle, message: Message) -> isize {
        unsafe {
            SendMessageW(
                hwnd(handle),
                message.code,
                Some(WPARAM(message.wparam)),
                Some(LPARAM(message.lparam)),
            )
            .0
        }
    }

    fn get_text(&self, handle: WidgetHandle, property: TextProperty, buf: &mut [u16]) -> isize {
        if buf.is_empty() {
            return 0;
        }
        let ptr = buf.as_mut_ptr();
        let len = buf.len();
        unsafe {
            match property {
                TextProperty::CueBanner => SendMessageW(
                    hwnd(handle),
                    EM_GETCUEBANNER,
                    Some(WPARAM(ptr as usize)),
                    Some(LPARAM(len as isize)),
                ),
                TextProperty::WindowText => SendMessageW(
                    hwnd(handle),
                    WM_GETTEXT,
                    Some(WPARAM(len)),
                    Some(LPARAM(ptr as isize)),
                ),
            }
            .0
        }
    }

    fn set_text(&self, handle: WidgetHandle, property: TextProperty, value: &[u16]) -> isize {
        let code = match property {
            TextProperty::CueBanner => EM_SETCUEBANNER,
            TextProperty::WindowText => WM_SETTEXT,
        };
        unsafe {
            SendMessageW(
                hwnd(handle),
                code,
                Some(WPARAM(0)),
                Some(LPARAM(value.as_ptr() as isize)),
            )
            .0
        }
    }

    fn default_font(&self) -> FontHandle {
        FontHandle(unsafe { GetStockObject(DEFAULT_GUI_FONT) }.0 as usize)
    }

    fn dialog_base_units(&self, handle: WidgetHandle) -> Size {
        if let Some(measured) = self.measure_font(handle) {
            return measured;
        }
        let units = unsafe { GetDialogBaseUnits() };
        Size::new(units & 0xFFFF, (units >> 16) & 0xFFFF)
    }

    fn last_error(&self) -> u32 {
        unsafe { GetLastError() }.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_interception_routine_is_stable_and_non_null() {
        let native = Win32Native::new();
        let first = native.interception_routine(ControlClass::Edit);
        assert!(!first.is_null());
        assert_eq!(first, native.interception_routine(ControlClass::Edit));
    }

    #[test]
    fn edit_class_has_a_default_procedure() {
        let native = Win32Native::new();
        let default = native.class_default_handler(ControlClass::Edit);
        assert!(!default.is_null());
        assert_ne!(default, native.interception_routine(ControlClass::Edit));
    }

    #[test]
    fn hand_built_toolkit_needs_install_dispatcher() {
        let toolkit = Toolkit::new(Rc::new(Win32Native::new()));
        assert!(current_toolkit().is_none());

        install_dispatcher(&toolkit);
        assert!(current_toolkit().is_some());
    }

    #[test]
    fn dispatcher_slot_does_not_keep_toolkit_alive() {
        let toolkit = Win32Native::toolkit(ToolkitConfig::default());
        assert!(current_toolkit().is_some());
        drop(toolkit);
        assert!(current_toolkit().is_none());
    }
}
