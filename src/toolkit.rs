/*
 * Root context shared by every widget: the native layer, the handle registry,
 * the per-class interception table, and configuration. Cloning a `Toolkit`
 * is cheap and yields a handle to the same context.
 *
 * Everything here runs on the thread that owns the native event loop; the
 * interior `RefCell`s are never borrowed across a native call, because native
 * calls may re-enter the dispatch path synchronously.
 */

use crate::native::NativeApi;
use crate::registry::HandleRegistry;
use crate::subclass::{self, Interception, SubclassTable};
use crate::types::{ControlClass, HandlerRef, Message, ToolkitConfig, WidgetHandle};
use crate::widget::Control;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

struct ToolkitInner {
    native: Rc<dyn NativeApi>,
    registry: RefCell<HandleRegistry>,
    subclasses: RefCell<SubclassTable>,
    config: ToolkitConfig,
}

#[derive(Clone)]
pub struct Toolkit {
    inner: Rc<ToolkitInner>,
}

/// Non-owning reference to a toolkit, for callbacks that must not keep it alive.
#[derive(Clone)]
pub struct WeakToolkit {
    inner: Weak<ToolkitInner>,
}

impl WeakToolkit {
    pub fn upgrade(&self) -> Option<Toolkit> {
        self.inner.upgrade().map(|inner| Toolkit { inner })
    }
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("config", &self.inner.config)
            .field("registered", &self.inner.registry.borrow().len())
            .finish()
    }
}

impl Toolkit {
    pub fn new(native: Rc<dyn NativeApi>) -> Self {
        Self::with_config(native, ToolkitConfig::default())
    }

    pub fn with_config(native: Rc<dyn NativeApi>, config: ToolkitConfig) -> Self {
        log::debug!("Toolkit: created with {config:?}");
        Self {
            inner: Rc::new(ToolkitInner {
                native,
                registry: RefCell::new(HandleRegistry::new()),
                subclasses: RefCell::new(SubclassTable::new()),
                config,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakToolkit {
        WeakToolkit {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn native(&self) -> &dyn NativeApi {
        self.inner.native.as_ref()
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> Ref<'_, HandleRegistry> {
        self.inner.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, HandleRegistry> {
        self.inner.registry.borrow_mut()
    }

    /// Resolves a native handle to its registered widget.
    pub fn lookup(&self, handle: WidgetHandle) -> Option<Rc<dyn Control>> {
        self.inner.registry.borrow().lookup(handle)
    }

    /// Installs the interception routine for `class` unless already installed.
    pub fn ensure_interception(&self, class: ControlClass) -> Interception {
        self.inner
            .subclasses
            .borrow_mut()
            .ensure_installed(self.native(), class)
    }

    pub fn interception(&self, class: ControlClass) -> Option<Interception> {
        self.inner.subclasses.borrow().get(class)
    }

    pub fn is_interception_installed(&self, class: ControlClass) -> bool {
        self.inner.subclasses.borrow().is_installed(class)
    }

    /// The handler `handle` had before interception, until it is destroyed.
    pub fn original_handler_of(&self, handle: WidgetHandle) -> Option<HandlerRef> {
        self.inner.subclasses.borrow().original_of(handle)
    }

    pub(crate) fn record_original(&self, handle: WidgetHandle, original: HandlerRef) {
        self.inner
            .subclasses
            .borrow_mut()
            .record_original(handle, original);
    }

    pub(crate) fn forget_original(&self, handle: WidgetHandle) -> Option<HandlerRef> {
        self.inner.subclasses.borrow_mut().forget_original(handle)
    }

    /// Entry point for a native interception routine of `class`.
    pub fn dispatch(&self, class: ControlClass, handle: WidgetHandle, message: Message) -> isize {
        subclass::dispatch(self, class, handle, message)
    }
}
