/*
 * In-memory native layer for tests. It hands out predictable handles, keeps a
 * per-control handler chain like the real platform (events sent to a control
 * go to its active handler, which may be the interception routine), counts
 * create/destroy calls, and can be told to fail any one native step.
 */

use crate::messages::{
    EM_LIMITTEXT, EM_SETREADONLY, FALSE, TRUE, WM_GETTEXTLENGTH, WM_NCDESTROY, WM_SETFONT,
};
use crate::native::NativeApi;
use crate::toolkit::{Toolkit, WeakToolkit};
use crate::types::{
    ControlClass, ControlCreateSpec, FontHandle, HandlerRef, Message, Size, TextProperty,
    WidgetHandle,
};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub(crate) const PARENT: WidgetHandle = WidgetHandle(0x10);
pub(crate) const CLASS_DEFAULT: HandlerRef = HandlerRef(0x1000);
pub(crate) const EDIT_ROUTINE: HandlerRef = HandlerRef(0x2000);
const DEFAULT_FONT: FontHandle = FontHandle(0x77);
const FIRST_HANDLE: usize = 0x100;

const ERROR_ACCESS_DENIED: u32 = 5;
const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;

/// Native steps that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeStep {
    Create,
    Subclass,
    SetText,
    GetText,
    SetCueBanner,
    GetCueBanner,
    SetReadOnly,
}

#[derive(Debug)]
struct FakeControl {
    active: HandlerRef,
    text: Vec<u16>,
    cue_banner: Vec<u16>,
    font: Option<FontHandle>,
    read_only: bool,
    limit: Option<usize>,
    received: Vec<u32>,
}

#[derive(Debug)]
struct FakeState {
    next_handle: usize,
    next_initial_handler: Option<HandlerRef>,
    controls: HashMap<WidgetHandle, FakeControl>,
    deliveries: Vec<(WidgetHandle, u32, HandlerRef)>,
}

pub(crate) struct FakeNative {
    state: RefCell<FakeState>,
    toolkit: RefCell<Option<WeakToolkit>>,
    failing: Cell<Option<FakeStep>>,
    base_units: Cell<Size>,
    last_error: Cell<u32>,
    creates: Cell<usize>,
    destroys: Cell<usize>,
    calls: Cell<usize>,
    interception_requests: Cell<usize>,
}

impl FakeNative {
    pub(crate) fn new() -> Self {
        Self {
            state: RefCell::new(FakeState {
                next_handle: FIRST_HANDLE,
                next_initial_handler: None,
                controls: HashMap::new(),
                deliveries: Vec::new(),
            }),
            toolkit: RefCell::new(None),
            failing: Cell::new(None),
            base_units: Cell::new(Size::new(8, 16)),
            last_error: Cell::new(0),
            creates: Cell::new(0),
            destroys: Cell::new(0),
            calls: Cell::new(0),
            interception_requests: Cell::new(0),
        }
    }

    /// Routes events that reach the interception routine to `toolkit`.
    pub(crate) fn attach(&self, toolkit: &Toolkit) {
        *self.toolkit.borrow_mut() = Some(toolkit.downgrade());
    }

    pub(crate) fn fail_at(&self, step: FakeStep) {
        self.failing.set(Some(step));
    }

    pub(crate) fn clear_failure(&self) {
        self.failing.set(None);
    }

    fn fails(&self, step: FakeStep) -> bool {
        self.failing.get() == Some(step)
    }

    pub(crate) fn peek_next_handle(&self) -> WidgetHandle {
        WidgetHandle(self.state.borrow().next_handle)
    }

    /// The next created control starts with `handler` instead of the class default.
    pub(crate) fn set_next_initial_handler(&self, handler: HandlerRef) {
        self.state.borrow_mut().next_initial_handler = Some(handler);
    }

    pub(crate) fn set_base_units(&self, base: Size) {
        self.base_units.set(base);
    }

    pub(crate) fn creates(&self) -> usize {
        self.creates.get()
    }

    pub(crate) fn destroys(&self) -> usize {
        self.destroys.get()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn interception_requests(&self) -> usize {
        self.interception_requests.get()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.state.borrow().controls.len()
    }

    pub(crate) fn is_live(&self, handle: WidgetHandle) -> bool {
        self.state.borrow().controls.contains_key(&handle)
    }

    pub(crate) fn class_default(&self) -> HandlerRef {
        CLASS_DEFAULT
    }

    pub(crate) fn default_font_handle(&self) -> FontHandle {
        DEFAULT_FONT
    }

    pub(crate) fn handler_of(&self, handle: WidgetHandle) -> Option<HandlerRef> {
        self.state.borrow().controls.get(&handle).map(|c| c.active)
    }

    pub(crate) fn font_of(&self, handle: WidgetHandle) -> Option<FontHandle> {
        self.state.borrow().controls.get(&handle).and_then(|c| c.font)
    }

    pub(crate) fn is_read_only(&self, handle: WidgetHandle) -> bool {
        self.state
            .borrow()
            .controls
            .get(&handle)
            .is_some_and(|c| c.read_only)
    }

    pub(crate) fn text_limit(&self, handle: WidgetHandle) -> Option<usize> {
        self.state.borrow().controls.get(&handle).and_then(|c| c.limit)
    }

    /// Whether a handler other than the interception routine saw `code` for `handle`.
    pub(crate) fn received(&self, handle: WidgetHandle, code: u32) -> bool {
        self.state
            .borrow()
            .controls
            .get(&handle)
            .is_some_and(|c| c.received.contains(&code))
    }

    /// Non-interception handlers that ran `code` for `handle`, in order. Outlives the control.
    pub(crate) fn handlers_run(&self, handle: WidgetHandle, code: u32) -> Vec<HandlerRef> {
        self.state
            .borrow()
            .deliveries
            .iter()
            .filter(|(h, c, _)| *h == handle && *c == code)
            .map(|(_, _, handler)| *handler)
            .collect()
    }

    pub(crate) fn send(&self, handle: WidgetHandle, message: Message) -> isize {
        self.send_message(handle, message)
    }

    /// Destroys a control the way a parent's destruction would, bypassing the widget.
    pub(crate) fn destroy_natively(&self, handle: WidgetHandle) -> bool {
        self.destroy(handle)
    }

    /// What `handler` answers for a message with no stateful meaning.
    pub(crate) fn result_via(&self, handler: HandlerRef, message: &Message) -> isize {
        (message.code as isize).wrapping_mul(31)
            ^ (message.wparam as isize).wrapping_add(message.lparam)
            ^ handler.0 as isize
    }

    pub(crate) fn default_result(&self, message: &Message) -> isize {
        self.result_via(CLASS_DEFAULT, message)
    }

    fn count_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn destroy(&self, handle: WidgetHandle) -> bool {
        let Some(active) = self.handler_of(handle) else {
            self.last_error.set(ERROR_INVALID_WINDOW_HANDLE);
            return false;
        };
        self.call_handler(active, handle, Message::new(WM_NCDESTROY, 0, 0));
        self.state.borrow_mut().controls.remove(&handle);
        self.destroys.set(self.destroys.get() + 1);
        true
    }

    /// Behavior of every handler that is not the interception routine.
    fn run_default(&self, handler: HandlerRef, handle: WidgetHandle, message: Message) -> isize {
        let fail_read_only = self.fails(FakeStep::SetReadOnly);
        let mut state = self.state.borrow_mut();
        state.deliveries.push((handle, message.code, handler));
        let Some(control) = state.controls.get_mut(&handle) else {
            return 0;
        };
        control.received.push(message.code);

        match message.code {
            WM_SETFONT => {
                control.font = Some(FontHandle(message.wparam));
                0
            }
            WM_GETTEXTLENGTH => control.text.len() as isize,
            EM_SETREADONLY if fail_read_only => FALSE,
            EM_SETREADONLY => {
                control.read_only = message.wparam != 0;
                TRUE
            }
            EM_LIMITTEXT => {
                control.limit = Some(message.wparam);
                0
            }
            WM_NCDESTROY => 0,
            _ => self.result_via(handler, &message),
        }
    }
}

impl NativeApi for FakeNative {
    fn create_control(&self, _spec: &ControlCreateSpec) -> Option<WidgetHandle> {
        self.count_call();
        if self.fails(FakeStep::Create) {
            self.last_error.set(ERROR_INVALID_WINDOW_HANDLE);
            return None;
        }

        let mut state = self.state.borrow_mut();
        let handle = WidgetHandle(state.next_handle);
        state.next_handle += 4;
        let active = state.next_initial_handler.take().unwrap_or(CLASS_DEFAULT);
        state.controls.insert(
            handle,
            FakeControl {
                active,
                text: Vec::new(),
                cue_banner: Vec::new(),
                font: None,
                read_only: false,
                limit: None,
                received: Vec::new(),
            },
        );
        self.creates.set(self.creates.get() + 1);
        Some(handle)
    }

    fn destroy_control(&self, handle: WidgetHandle) -> bool {
        self.count_call();
        self.destroy(handle)
    }

    fn set_event_handler(&self, handle: WidgetHandle, handler: HandlerRef) -> HandlerRef {
        self.count_call();
        if self.fails(FakeStep::Subclass) {
            self.last_error.set(ERROR_ACCESS_DENIED);
            return HandlerRef::NULL;
        }
        let mut state = self.state.borrow_mut();
        match state.controls.get_mut(&handle) {
            Some(control) => std::mem::replace(&mut control.active, handler),
            None => {
                self.last_error.set(ERROR_INVALID_WINDOW_HANDLE);
                HandlerRef::NULL
            }
        }
    }

    fn call_handler(&self, handler: HandlerRef, handle: WidgetHandle, message: Message) -> isize {
        self.count_call();
        if handler == EDIT_ROUTINE {
            let toolkit = self
                .toolkit
                .borrow()
                .as_ref()
                .and_then(WeakToolkit::upgrade);
            return match toolkit {
                Some(toolkit) => toolkit.dispatch(ControlClass::Edit, handle, message),
                None => self.run_default(CLASS_DEFAULT, handle, message),
            };
        }
        self.run_default(handler, handle, message)
    }

    fn class_default_handler(&self, _class: ControlClass) -> HandlerRef {
        self.count_call();
        CLASS_DEFAULT
    }

    fn interception_routine(&self, _class: ControlClass) -> HandlerRef {
        self.count_call();
        self.interception_requests
            .set(self.interception_requests.get() + 1);
        EDIT_ROUTINE
    }

    fn send_message(&self, handle: WidgetHandle, message: Message) -> isize {
        self.count_call();
        match self.handler_of(handle) {
            Some(active) => self.call_handler(active, handle, message),
            None => 0,
        }
    }

    fn get_text(&self, handle: WidgetHandle, property: TextProperty, buf: &mut [u16]) -> isize {
        self.count_call();
        let failing = match property {
            TextProperty::WindowText => self.fails(FakeStep::GetText),
            TextProperty::CueBanner => self.fails(FakeStep::GetCueBanner),
        };
        if failing {
            return FALSE;
        }
        let state = self.state.borrow();
        let Some(control) = state.controls.get(&handle) else {
            return FALSE;
        };
        if buf.is_empty() {
            return FALSE;
        }

        let source = match property {
            TextProperty::WindowText => &control.text,
            TextProperty::CueBanner => &control.cue_banner,
        };
        let copied = source.len().min(buf.len() - 1);
        buf[..copied].copy_from_slice(&source[..copied]);
        buf[copied] = 0;

        match property {
            TextProperty::WindowText => copied as isize,
            TextProperty::CueBanner => TRUE,
        }
    }

    fn set_text(&self, handle: WidgetHandle, property: TextProperty, value: &[u16]) -> isize {
        self.count_call();
        let failing = match property {
            TextProperty::WindowText => self.fails(FakeStep::SetText),
            TextProperty::CueBanner => self.fails(FakeStep::SetCueBanner),
        };
        if failing {
            return FALSE;
        }
        let mut state = self.state.borrow_mut();
        let Some(control) = state.controls.get_mut(&handle) else {
            return FALSE;
        };

        let end = value.iter().position(|&c| c == 0).unwrap_or(value.len());
        let stored = value[..end].to_vec();
        match property {
            TextProperty::WindowText => control.text = stored,
            TextProperty::CueBanner => control.cue_banner = stored,
        }
        TRUE
    }

    fn default_font(&self) -> FontHandle {
        self.count_call();
        DEFAULT_FONT
    }

    fn dialog_base_units(&self, _handle: WidgetHandle) -> Size {
        self.count_call();
        self.base_units.get()
    }

    fn last_error(&self) -> u32 {
        self.last_error.get()
    }
}
