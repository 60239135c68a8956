mod hover;

pub use hover::{HoverIndex, HoverInfo, nearest_index};

use std::fmt;

use tracing::trace;

pub type PointerCallback = Box<dyn FnMut()>;
pub type HoverCallback = Box<dyn FnMut(&HoverInfo)>;

/// Observers registered through `mouse_over`, `mouse_out` and `mouse_move`.
#[derive(Default)]
pub struct PointerCallbacks {
    over: Option<PointerCallback>,
    out: Option<PointerCallback>,
    hover: Option<HoverCallback>,
}

impl fmt::Debug for PointerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerCallbacks")
            .field("over", &self.over.is_some())
            .field("out", &self.out.is_some())
            .field("hover", &self.hover.is_some())
            .finish()
    }
}

impl PointerCallbacks {
    pub fn set_over(&mut self, callback: PointerCallback) {
        self.over = Some(callback);
    }

    pub fn set_out(&mut self, callback: PointerCallback) {
        self.out = Some(callback);
    }

    pub fn set_hover(&mut self, callback: HoverCallback) {
        self.hover = Some(callback);
    }
}

/// Tracks whether the pointer is inside the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    inside: bool,
    cursor_x: f64,
    cursor_y: f64,
}

impl PointerState {
    #[must_use]
    pub fn is_inside(self) -> bool {
        self.inside
    }

    #[must_use]
    pub fn cursor(self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }

    /// Handles a pointer move in plot coordinates.
    ///
    /// Entering the plot fires `over` before the hover observer; leaving it
    /// fires `out`. Moves outside the plot never reach the hover observer.
    pub fn on_pointer_move(
        &mut self,
        inside: bool,
        plot_x: f64,
        plot_y: f64,
        index: &HoverIndex,
        callbacks: &mut PointerCallbacks,
    ) -> Option<HoverInfo> {
        self.cursor_x = plot_x;
        self.cursor_y = plot_y;

        if !inside {
            self.on_pointer_leave(callbacks);
            return None;
        }
        if !self.inside {
            self.inside = true;
            trace!("pointer over");
            if let Some(over) = callbacks.over.as_mut() {
                over();
            }
        }

        let info = index.resolve(plot_x, plot_y)?;
        trace!(name = %info.name, left = info.left, "pointer hover");
        if let Some(hover) = callbacks.hover.as_mut() {
            hover(&info);
        }
        Some(info)
    }

    pub fn on_pointer_leave(&mut self, callbacks: &mut PointerCallbacks) {
        if !self.inside {
            return;
        }
        self.inside = false;
        trace!("pointer out");
        if let Some(out) = callbacks.out.as_mut() {
            out();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{HoverIndex, PointerCallbacks, PointerState};
    use crate::core::{Margin, XValue};

    #[test]
    fn over_fires_once_before_hover_and_out_on_leave() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut callbacks = PointerCallbacks::default();
        let log = Rc::clone(&events);
        callbacks.set_over(Box::new(move || log.borrow_mut().push("over")));
        let log = Rc::clone(&events);
        callbacks.set_out(Box::new(move || log.borrow_mut().push("out")));
        let log = Rc::clone(&events);
        callbacks.set_hover(Box::new(move |_| log.borrow_mut().push("move")));

        let mut index = HoverIndex::new(Margin::ZERO, vec!["a".to_owned()]);
        index.push(XValue::category("q1"), 5.0, vec![Some(1.0)]);

        let mut state = PointerState::default();
        state.on_pointer_move(true, 4.0, 1.0, &index, &mut callbacks);
        state.on_pointer_move(true, 6.0, 1.0, &index, &mut callbacks);
        state.on_pointer_move(false, -1.0, 1.0, &index, &mut callbacks);
        state.on_pointer_leave(&mut callbacks);

        assert_eq!(*events.borrow(), vec!["over", "move", "move", "out"]);
        assert!(!state.is_inside());
    }
}
