/*
 * Widget base shared by every subclassed control, and the `Control`
 * capability the dispatch core depends on. A `Widget` owns its native handle:
 * dropping or disposing it destroys the control and removes its registry
 * entry, so any construction step that bails out with `?` releases the handle
 * without further bookkeeping.
 */

use crate::container::Container;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::{FALSE, WM_GETTEXTLENGTH, WM_NCDESTROY, WM_SETFONT};
use crate::native::NativeApi;
use crate::subclass;
use crate::toolkit::Toolkit;
use crate::types::{
    ControlClass, FontHandle, HandlerRef, LayoutFlags, Message, Size, TextProperty, WidgetHandle,
    dialog_units_to_pixels, from_wide_null, to_wide_null,
};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/*
 * What the interception routine needs from a registered widget. Any type
 * implementing this can be routed to, independent of its concrete class.
 */
pub trait Control {
    /// The live native handle, or `WidgetHandle::NULL` once disposed.
    fn handle(&self) -> WidgetHandle;

    /// The handler that was active on this instance before interception.
    fn original_handler(&self) -> HandlerRef;

    /*
     * Handles one event. Return a value to override the native behavior, or
     * call `fallback` and return its result unchanged to keep it.
     */
    fn handle_event(&self, message: &Message, fallback: &Fallback<'_>) -> isize;

    fn layout_flags(&self) -> LayoutFlags;

    fn preferred_size(&self) -> Size;
}

/// The pre-interception handler of one instance, callable from `handle_event`.
pub struct Fallback<'a> {
    native: &'a dyn NativeApi,
    handler: HandlerRef,
    handle: WidgetHandle,
}

impl<'a> Fallback<'a> {
    pub fn new(native: &'a dyn NativeApi, handler: HandlerRef, handle: WidgetHandle) -> Self {
        Self {
            native,
            handler,
            handle,
        }
    }

    pub fn handler(&self) -> HandlerRef {
        self.handler
    }

    pub fn call(&self, message: &Message) -> isize {
        self.native.call_handler(self.handler, self.handle, *message)
    }
}

pub struct Widget {
    toolkit: Toolkit,
    handle: Cell<WidgetHandle>,
    original_handler: Cell<HandlerRef>,
    registered: Cell<bool>,
    font: Cell<Option<FontHandle>>,
    parent: RefCell<Option<Weak<dyn Container>>>,
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("handle", &self.handle.get())
            .field("original_handler", &self.original_handler.get())
            .field("registered", &self.registered.get())
            .finish()
    }
}

impl Widget {
    pub(crate) fn new(toolkit: &Toolkit, handle: WidgetHandle) -> Self {
        Self {
            toolkit: toolkit.clone(),
            handle: Cell::new(handle),
            original_handler: Cell::new(HandlerRef::NULL),
            registered: Cell::new(false),
            font: Cell::new(None),
            parent: RefCell::new(None),
        }
    }

    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    pub fn handle(&self) -> WidgetHandle {
        self.handle.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.get().is_null()
    }

    pub fn original_handler(&self) -> HandlerRef {
        self.original_handler.get()
    }

    pub(crate) fn live_handle(&self) -> PlatformResult<WidgetHandle> {
        let handle = self.handle.get();
        if handle.is_null() {
            return Err(PlatformError::InvalidHandle(
                "widget has already been disposed".into(),
            ));
        }
        Ok(handle)
    }

    /// Makes the class interception routine this instance's active handler.
    pub(crate) fn subclass(&self, class: ControlClass) -> PlatformResult<()> {
        let handle = self.live_handle()?;
        let original = subclass::install(&self.toolkit, handle, class)?;
        self.original_handler.set(original);
        Ok(())
    }

    pub(crate) fn register<C: Control + 'static>(&self, control: Weak<C>) -> PlatformResult<()> {
        let handle = self.live_handle()?;
        let control: Weak<dyn Control> = control;
        self.toolkit.registry_mut().insert(handle, control)?;
        self.registered.set(true);
        Ok(())
    }

    pub fn font(&self) -> Option<FontHandle> {
        self.font.get()
    }

    pub fn set_font(&self, font: FontHandle) -> PlatformResult<()> {
        let handle = self.live_handle()?;
        self.toolkit
            .native()
            .send_message(handle, Message::new(WM_SETFONT, font.0, 1));
        self.font.set(Some(font));
        Ok(())
    }

    pub fn parent(&self) -> Option<Rc<dyn Container>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_parent(&self, parent: &Rc<dyn Container>) {
        *self.parent.borrow_mut() = Some(Rc::downgrade(parent));
    }

    pub fn text(&self) -> PlatformResult<String> {
        let handle = self.live_handle()?;
        let native = self.toolkit.native();
        let len = native.send_message(handle, Message::new(WM_GETTEXTLENGTH, 0, 0));
        let mut buf = vec![0u16; len.max(0) as usize + 1];
        let copied = native.get_text(handle, TextProperty::WindowText, &mut buf);
        if len > 0 && copied == 0 {
            return Err(PlatformError::OperationFailed("WM_GETTEXT failed".into()));
        }
        Ok(from_wide_null(&buf))
    }

    pub fn set_text(&self, text: &str) -> PlatformResult<()> {
        let handle = self.live_handle()?;
        let wide = to_wide_null(text);
        if self
            .toolkit
            .native()
            .set_text(handle, TextProperty::WindowText, &wide)
            == FALSE
        {
            return Err(PlatformError::OperationFailed("WM_SETTEXT failed".into()));
        }
        Ok(())
    }

    /// Converts a size in dialog units using this control's font metrics.
    pub fn dialog_units_to_pixels(&self, units: Size) -> Size {
        let base = self.toolkit.native().dialog_base_units(self.handle.get());
        dialog_units_to_pixels(units, base)
    }

    /*
     * Default event handling for every widget: observe native destruction,
     * then hand the event to the original handler.
     */
    pub fn handle_event(&self, message: &Message, fallback: &Fallback<'_>) -> isize {
        if message.code == WM_NCDESTROY {
            log::debug!(
                "Widget: handle {} destroyed natively; releasing registration",
                self.handle.get()
            );
            self.release();
        }
        fallback.call(message)
    }

    /*
     * Releases the native handle and the registry entry. Safe to call more
     * than once; only the first call has an effect.
     */
    pub fn dispose(&self) {
        let Some(handle) = self.release() else {
            return;
        };
        if !self.toolkit.native().destroy_control(handle) {
            log::warn!("Widget: destroying handle {handle} reported failure");
            self.toolkit.forget_original(handle);
        }
        log::debug!("Widget: disposed handle {handle}");
    }

    /// Detaches from registry and parent; returns the handle it held, if any.
    fn release(&self) -> Option<WidgetHandle> {
        let handle = self.handle.replace(WidgetHandle::NULL);
        if handle.is_null() {
            return None;
        }
        if self.registered.replace(false) {
            self.toolkit.registry_mut().remove(handle);
        }
        if let Some(parent) = self.parent() {
            parent.children().remove(handle);
        }
        Some(handle)
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.dispose();
    }
}
