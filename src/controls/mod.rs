/*
 * Concrete subclassed controls. Each handler module owns one native control
 * class: its creation styles, its accessors, and its `Control` implementation.
 */
pub(crate) mod line_edit_handler;

pub use line_edit_handler::LineEdit;
