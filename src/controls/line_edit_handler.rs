/*
 * Single-line text entry built on the native EDIT class. The control is
 * subclassed so it can claim the Return key from the dialog manager; every
 * other event keeps the native EDIT behavior.
 *
 * Construction acquires the native handle first and wraps it in a `Widget`
 * immediately, so a failure in any later step drops the half-built object and
 * destroys the handle before the error reaches the caller.
 */

use crate::container::Container;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::{
    DLGC_WANTALLKEYS, EM_LIMITTEXT, EM_SETREADONLY, ES_AUTOHSCROLL, FALSE, VK_RETURN, WM_GETDLGCODE,
    WS_CHILD, WS_EX_CLIENTEDGE, WS_TABSTOP, WS_VISIBLE,
};
use crate::toolkit::Toolkit;
use crate::types::{
    ControlClass, ControlCreateSpec, HandlerRef, LayoutFlags, LineEditOptions, Message, Size,
    TextProperty, WidgetHandle, from_wide_null, to_wide_null,
};
use crate::widget::{Control, Fallback, Widget};

use std::rc::{Rc, Weak};

const INITIAL_WIDTH: i32 = 120;
const INITIAL_HEIGHT: i32 = 24;
/// Nominal size reported to layout managers, in dialog units.
const PREFERRED_SIZE_DLU: Size = Size::new(50, 14);

/// Strongly-typed style pair for line edits, so creation cannot drop a required flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineEditWindowStyle {
    ex_style: u32,
    style: u32,
}

impl LineEditWindowStyle {
    /// Sunken client edge, horizontal auto-scroll, visible tab-stop child.
    const fn base() -> Self {
        Self {
            ex_style: WS_EX_CLIENTEDGE,
            style: ES_AUTOHSCROLL | WS_CHILD | WS_TABSTOP | WS_VISIBLE,
        }
    }

    fn create_spec(self, parent: WidgetHandle) -> ControlCreateSpec {
        ControlCreateSpec {
            class: ControlClass::Edit,
            parent,
            ex_style: self.ex_style,
            style: self.style,
            size: Size::new(INITIAL_WIDTH, INITIAL_HEIGHT),
        }
    }
}

#[derive(Debug)]
pub struct LineEdit {
    widget: Widget,
}

impl LineEdit {
    /// Creates a line edit as a native child of `parent`.
    pub fn create(toolkit: &Toolkit, parent: WidgetHandle) -> PlatformResult<Rc<LineEdit>> {
        Self::create_with_options(toolkit, parent, &LineEditOptions::default())
    }

    pub fn create_with_options(
        toolkit: &Toolkit,
        parent: WidgetHandle,
        options: &LineEditOptions,
    ) -> PlatformResult<Rc<LineEdit>> {
        toolkit.ensure_interception(ControlClass::Edit);

        let native = toolkit.native();
        let spec = LineEditWindowStyle::base().create_spec(parent);
        let Some(handle) = native.create_control(&spec) else {
            let code = native.last_error();
            log::error!(
                "LineEditHandler: creating EDIT under parent {parent} failed (error {code:#010x})"
            );
            return Err(PlatformError::CreationFailed {
                class: ControlClass::Edit.class_name(),
                code,
            });
        };

        // From here on, returning early drops `line_edit` and destroys `handle`.
        let line_edit = Rc::new(LineEdit {
            widget: Widget::new(toolkit, handle),
        });

        line_edit.widget.subclass(ControlClass::Edit)?;

        if toolkit.config().apply_default_font {
            line_edit.widget.set_font(native.default_font())?;
        }

        let weak: Weak<LineEdit> = Rc::downgrade(&line_edit);
        line_edit.widget.register(weak)?;

        line_edit.apply_options(options)?;

        log::debug!("LineEditHandler: created line edit {handle} under parent {parent}");
        Ok(line_edit)
    }

    /*
     * Creates a line edit inside `parent` and adds it to the parent's children.
     * An absent parent is rejected before any native call is made.
     */
    pub fn attach(
        toolkit: &Toolkit,
        parent: Option<&Rc<dyn Container>>,
    ) -> PlatformResult<Rc<LineEdit>> {
        Self::attach_with_options(toolkit, parent, &LineEditOptions::default())
    }

    pub fn attach_with_options(
        toolkit: &Toolkit,
        parent: Option<&Rc<dyn Container>>,
        options: &LineEditOptions,
    ) -> PlatformResult<Rc<LineEdit>> {
        let Some(parent) = parent else {
            return Err(PlatformError::InvalidArgument(
                "parent cannot be absent".into(),
            ));
        };

        let line_edit = Self::create_with_options(toolkit, parent.handle(), options)?;

        line_edit.widget.set_parent(parent);
        if let Err(err) = parent.children().add(line_edit.clone()) {
            log::warn!(
                "LineEditHandler: parent {} rejected line edit {}: {err}",
                parent.handle(),
                line_edit.handle()
            );
            return Err(err);
        }

        Ok(line_edit)
    }

    fn apply_options(&self, options: &LineEditOptions) -> PlatformResult<()> {
        if let Some(text) = &options.text {
            self.widget.set_text(text)?;
        }
        if let Some(cue_banner) = &options.cue_banner {
            self.set_cue_banner(cue_banner)?;
        }
        if options.read_only {
            self.set_read_only(true)?;
        }
        if let Some(max_length) = options.max_length {
            self.set_max_length(max_length)?;
        }
        Ok(())
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn handle(&self) -> WidgetHandle {
        self.widget.handle()
    }

    pub fn dispose(&self) {
        self.widget.dispose();
    }

    /*
     * Reads the cue banner through a buffer of `cue_banner_capacity` UTF-16
     * units. A banner longer than `capacity - 1` units comes back truncated to
     * that many units.
     */
    pub fn cue_banner(&self) -> PlatformResult<String> {
        let handle = self.widget.live_handle()?;
        let toolkit = self.widget.toolkit();
        let mut buf = vec![0u16; toolkit.config().cue_banner_capacity.max(1)];
        if toolkit
            .native()
            .get_text(handle, TextProperty::CueBanner, &mut buf)
            == FALSE
        {
            return Err(PlatformError::OperationFailed(
                "EM_GETCUEBANNER failed".into(),
            ));
        }
        Ok(from_wide_null(&buf))
    }

    pub fn set_cue_banner(&self, value: &str) -> PlatformResult<()> {
        let handle = self.widget.live_handle()?;
        let wide = to_wide_null(value);
        if self
            .widget
            .toolkit()
            .native()
            .set_text(handle, TextProperty::CueBanner, &wide)
            == FALSE
        {
            return Err(PlatformError::OperationFailed(
                "EM_SETCUEBANNER failed".into(),
            ));
        }
        Ok(())
    }

    pub fn text(&self) -> PlatformResult<String> {
        self.widget.text()
    }

    pub fn set_text(&self, text: &str) -> PlatformResult<()> {
        self.widget.set_text(text)
    }

    pub fn set_read_only(&self, read_only: bool) -> PlatformResult<()> {
        let handle = self.widget.live_handle()?;
        let message = Message::new(EM_SETREADONLY, read_only as usize, 0);
        if self.widget.toolkit().native().send_message(handle, message) == FALSE {
            return Err(PlatformError::OperationFailed(
                "EM_SETREADONLY failed".into(),
            ));
        }
        Ok(())
    }

    /*
     * Limits the text to `max_length` UTF-16 units; 0 restores the platform
     * maximum. `EM_LIMITTEXT` has no failure result, so the only error is
     * `InvalidHandle` on a disposed widget.
     */
    pub fn set_max_length(&self, max_length: usize) -> PlatformResult<()> {
        let handle = self.widget.live_handle()?;
        self.widget
            .toolkit()
            .native()
            .send_message(handle, Message::new(EM_LIMITTEXT, max_length, 0));
        Ok(())
    }
}

impl Control for LineEdit {
    fn handle(&self) -> WidgetHandle {
        self.widget.handle()
    }

    fn original_handler(&self) -> HandlerRef {
        self.widget.original_handler()
    }

    fn handle_event(&self, message: &Message, fallback: &Fallback<'_>) -> isize {
        // Keep Return as text input instead of the dialog's default button.
        if message.code == WM_GETDLGCODE && message.wparam == VK_RETURN {
            return DLGC_WANTALLKEYS;
        }
        self.widget.handle_event(message, fallback)
    }

    fn layout_flags(&self) -> LayoutFlags {
        LayoutFlags::SHRINK_HORIZONTAL | LayoutFlags::GROW_HORIZONTAL
    }

    fn preferred_size(&self) -> Size {
        self.widget.dialog_units_to_pixels(PREFERRED_SIZE_DLU)
    }
}
