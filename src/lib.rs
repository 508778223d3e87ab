/*
 * Public entry point of the linedit crate: a subclassed single-line edit
 * control on top of a native windowing layer.
 *
 * The dispatch core (handle registry, per-class interception, widget base, and
 * the line edit itself) is platform-agnostic and talks to the OS only through
 * `NativeApi`. The Win32 implementation of that seam is compiled on Windows
 * only, so every other platform can still build and test the core logic.
 */
pub mod container;
pub mod controls;
pub mod error;
pub mod messages;
pub mod native;
pub mod registry;
pub mod subclass;
#[cfg(test)]
pub(crate) mod testing;
pub mod toolkit;
pub mod types;
pub mod widget;
#[cfg(target_os = "windows")]
pub mod win32;

pub use container::{ChildCollection, ChildList, Composite, Container};
pub use controls::LineEdit;
pub use error::{PlatformError, Result as PlatformResult};
pub use native::NativeApi;
pub use registry::{HandleRegistry, WidgetKey};
pub use subclass::{Interception, SubclassTable};
pub use toolkit::{Toolkit, WeakToolkit};
pub use types::{
    ControlClass, ControlCreateSpec, FontHandle, HandlerRef, LayoutFlags, LineEditOptions,
    Message, Size, TextProperty, ToolkitConfig, WidgetHandle,
};
pub use widget::{Control, Fallback, Widget};
#[cfg(target_os = "windows")]
pub use win32::Win32Native;
