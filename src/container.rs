/*
 * Child-collection contract consumed by widgets that attach to a parent.
 * A container exposes its native handle (used as the parent of new controls)
 * and a collection that keeps its children alive.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::WidgetHandle;
use crate::widget::Control;

use std::cell::RefCell;
use std::rc::Rc;

pub trait ChildCollection {
    fn add(&self, child: Rc<dyn Control>) -> PlatformResult<()>;

    /// Removes the child owning `handle`. Returns `false` if it was not present.
    fn remove(&self, handle: WidgetHandle) -> bool;

    fn contains(&self, handle: WidgetHandle) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait Container {
    fn handle(&self) -> WidgetHandle;

    fn children(&self) -> &dyn ChildCollection;
}

/*
 * Ordered child list; rejects disposed widgets and duplicate handles. Each
 * child is keyed by the handle it had when added, since a disposing widget
 * reports a null handle by the time it asks to be removed.
 */
#[derive(Default)]
pub struct ChildList {
    items: RefCell<Vec<(WidgetHandle, Rc<dyn Control>)>>,
}

impl ChildList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> Vec<WidgetHandle> {
        self.items.borrow().iter().map(|(h, _)| *h).collect()
    }
}

impl ChildCollection for ChildList {
    fn add(&self, child: Rc<dyn Control>) -> PlatformResult<()> {
        let handle = child.handle();
        if handle.is_null() {
            return Err(PlatformError::OperationFailed(
                "cannot add a disposed widget to a container".into(),
            ));
        }
        if self.contains(handle) {
            return Err(PlatformError::OperationFailed(format!(
                "widget {handle} is already a child of this container"
            )));
        }
        self.items.borrow_mut().push((handle, child));
        Ok(())
    }

    fn remove(&self, handle: WidgetHandle) -> bool {
        let removed = {
            let mut items = self.items.borrow_mut();
            let index = items.iter().position(|(h, _)| *h == handle);
            index.map(|index| items.remove(index))
        };
        // Dropped outside the borrow: the child may dispose itself and call back.
        removed.is_some()
    }

    fn contains(&self, handle: WidgetHandle) -> bool {
        self.items.borrow().iter().any(|(h, _)| *h == handle)
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

/// A container around an existing native parent window.
pub struct Composite {
    handle: WidgetHandle,
    children: ChildList,
}

impl Composite {
    pub fn new(handle: WidgetHandle) -> Self {
        Self {
            handle,
            children: ChildList::new(),
        }
    }
}

impl Container for Composite {
    fn handle(&self) -> WidgetHandle {
        self.handle
    }

    fn children(&self) -> &dyn ChildCollection {
        &self.children
    }
}
