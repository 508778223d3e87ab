/*
 * Control subclassing: the per-class interception routine and the dispatch
 * path it runs for every native event aimed at a subclassed control.
 *
 * Each control class gets one interception routine for the process lifetime,
 * requested from the native layer the first time a control of that class is
 * built. The handler each instance had before interception is stored on the
 * instance itself, so two controls of one class that started from different
 * handlers each fall back to their own. The table also keeps it by handle
 * from installation until `WM_NCDESTROY`, which covers events that arrive
 * while no widget is registered (during construction and disposal).
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::WM_NCDESTROY;
use crate::native::NativeApi;
use crate::toolkit::Toolkit;
use crate::types::{ControlClass, HandlerRef, Message, WidgetHandle};
use crate::widget::Fallback;

use std::collections::HashMap;

/// Installed state for one control class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interception {
    /// Entry point the native layer calls for every event of this class.
    pub routine: HandlerRef,
    /// Handler a control of this class has when freshly created. Used for
    /// handles that carry the routine but have no registered widget.
    pub class_default: HandlerRef,
}

#[derive(Debug, Default)]
pub struct SubclassTable {
    installed: HashMap<ControlClass, Interception>,
    originals: HashMap<WidgetHandle, HandlerRef>,
}

impl SubclassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the class's interception, requesting it from `native` only once.
    pub fn ensure_installed(&mut self, native: &dyn NativeApi, class: ControlClass) -> Interception {
        *self.installed.entry(class).or_insert_with(|| {
            let interception = Interception {
                routine: native.interception_routine(class),
                class_default: native.class_default_handler(class),
            };
            log::debug!(
                "Subclass: installed interception for {} (routine {:#x}, class default {:#x})",
                class.class_name(),
                interception.routine.0,
                interception.class_default.0
            );
            interception
        })
    }

    pub fn get(&self, class: ControlClass) -> Option<Interception> {
        self.installed.get(&class).copied()
    }

    pub fn is_installed(&self, class: ControlClass) -> bool {
        self.installed.contains_key(&class)
    }

    pub(crate) fn record_original(&mut self, handle: WidgetHandle, original: HandlerRef) {
        self.originals.insert(handle, original);
    }

    /// The handler `handle` had before interception, while it is still alive.
    pub fn original_of(&self, handle: WidgetHandle) -> Option<HandlerRef> {
        self.originals.get(&handle).copied()
    }

    pub(crate) fn forget_original(&mut self, handle: WidgetHandle) -> Option<HandlerRef> {
        self.originals.remove(&handle)
    }
}

/*
 * Makes the class interception routine the active handler of `handle` and
 * returns the handler it replaced.
 *
 * The native "set handler" primitive answers `HandlerRef::NULL` both for
 * "there was no previous handler" and for "the call failed". A freshly created
 * control always has a handler, so NULL is treated as failure unconditionally.
 */
pub(crate) fn install(
    toolkit: &Toolkit,
    handle: WidgetHandle,
    class: ControlClass,
) -> PlatformResult<HandlerRef> {
    let interception = toolkit.ensure_interception(class);
    let native = toolkit.native();

    let previous = native.set_event_handler(handle, interception.routine);
    if previous.is_null() {
        let code = native.last_error();
        log::error!(
            "Subclass: setting the event handler of {handle} failed (error {code:#010x})"
        );
        return Err(PlatformError::SubclassFailed { code });
    }
    if previous == interception.routine {
        // Calling through would re-enter the routine forever.
        log::error!("Subclass: handle {handle} is already intercepted");
        return Err(PlatformError::SubclassFailed { code: 0 });
    }

    toolkit.record_original(handle, previous);
    log::debug!(
        "Subclass: intercepted {handle}, original handler {:#x}",
        previous.0
    );
    Ok(previous)
}

/*
 * The body of every interception routine. Resolves the owning widget through
 * the toolkit's registry. A handle with no registered widget goes to the
 * handler it had before interception, or to the class default handler when
 * it was never intercepted through this toolkit, so the platform always gets
 * an answer.
 */
pub(crate) fn dispatch(
    toolkit: &Toolkit,
    class: ControlClass,
    handle: WidgetHandle,
    message: Message,
) -> isize {
    let native = toolkit.native();

    let result = match toolkit.lookup(handle) {
        Some(control) => {
            let fallback = Fallback::new(native, control.original_handler(), handle);
            control.handle_event(&message, &fallback)
        }
        None => {
            let handler = match toolkit.original_handler_of(handle) {
                Some(original) => original,
                None => unregistered_handler(toolkit, class, handle, &message),
            };
            native.call_handler(handler, handle, message)
        }
    };

    // Last event a native control receives.
    if message.code == WM_NCDESTROY {
        toolkit.forget_original(handle);
    }
    result
}

fn unregistered_handler(
    toolkit: &Toolkit,
    class: ControlClass,
    handle: WidgetHandle,
    message: &Message,
) -> HandlerRef {
    match toolkit.interception(class) {
        Some(interception) => interception.class_default,
        None => {
            log::warn!(
                "Subclass: event {:#06x} for {handle} before {} interception was installed",
                message.code,
                class.class_name()
            );
            toolkit.native().class_default_handler(class)
        }
    }
}
