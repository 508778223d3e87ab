/*
 * The seam between the widget layer and the OS windowing subsystem. Every
 * native primitive the controls need goes through `NativeApi`, so the dispatch
 * core, the registry, and the controls can be exercised against a fake on any
 * platform. On Windows, `crate::win32::Win32Native` is the real implementation.
 *
 * All methods report failure with the platform's sentinels rather than
 * `Result`; the widget layer decides which sentinel means what and maps it to
 * a `PlatformError`.
 */

use crate::types::{
    ControlClass, ControlCreateSpec, FontHandle, HandlerRef, Message, Size, TextProperty,
    WidgetHandle,
};

pub trait NativeApi {
    /// Creates a control; `None` when the platform returned no handle.
    fn create_control(&self, spec: &ControlCreateSpec) -> Option<WidgetHandle>;

    /// Destroys a control. Returns `false` if the handle was not live.
    fn destroy_control(&self, handle: WidgetHandle) -> bool;

    /*
     * Installs `handler` as the control's active event handler and returns the
     * handler that was active before. `HandlerRef::NULL` means either "there was
     * no previous handler" or "the call failed"; the platform does not tell
     * them apart through the return value.
     */
    fn set_event_handler(&self, handle: WidgetHandle, handler: HandlerRef) -> HandlerRef;

    /// Invokes a specific handler synchronously (CallWindowProc).
    fn call_handler(&self, handler: HandlerRef, handle: WidgetHandle, message: Message) -> isize;

    /// The handler every control of `class` starts out with.
    fn class_default_handler(&self, class: ControlClass) -> HandlerRef;

    /// The process-wide interception entry point for `class`.
    fn interception_routine(&self, class: ControlClass) -> HandlerRef;

    /// Sends a scalar message synchronously to the control's active handler.
    fn send_message(&self, handle: WidgetHandle, message: Message) -> isize;

    /*
     * Reads a text property into `buf`. At most `buf.len() - 1` UTF-16 units
     * plus a terminator are written. Returns the platform's result for the
     * request (0 is the failure sentinel for cue banners).
     */
    fn get_text(&self, handle: WidgetHandle, property: TextProperty, buf: &mut [u16]) -> isize;

    /// Writes a null-terminated text property.
    fn set_text(&self, handle: WidgetHandle, property: TextProperty, value: &[u16]) -> isize;

    fn default_font(&self) -> FontHandle;

    /// Dialog base units (average character width and height) for the control.
    fn dialog_base_units(&self, handle: WidgetHandle) -> Size;

    /// The thread's last native error code.
    fn last_error(&self) -> u32;
}
