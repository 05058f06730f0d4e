//! A thread-local, LIFO stack of named frames, restored on scope exit via
//! `Drop` so unwinding (a panicking test) still leaves the head correct. Its
//! only consumer is the panic hook, which reads the current head to decide
//! what to call the thing that just panicked.

use std::cell::Cell;

thread_local! {
    static CURRENT_FRAME: Cell<Option<&'static str>> = const { Cell::new(None) };
}

/// Returns the name of the innermost active scope, if any.
pub fn current_frame_name() -> Option<&'static str> {
    CURRENT_FRAME.with(|c| c.get())
}

/// RAII guard that replaces the thread-local frame name for its lifetime and
/// restores the previous one on drop. The runner uses this once per test,
/// replacing (not nesting under) whatever frame name preceded it, so a panic
/// during test execution is attributed to the test alone.
pub struct StackFrame {
    previous: Option<&'static str>,
}

impl StackFrame {
    pub fn enter(name: &'static str) -> Self {
        let previous = CURRENT_FRAME.with(|c| c.replace(Some(name)));
        Self { previous }
    }
}

impl Drop for StackFrame {
    fn drop(&mut self) {
        CURRENT_FRAME.with(|c| c.set(self.previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_restores_previous_on_drop() {
        assert_eq!(current_frame_name(), None);
        {
            let _outer = StackFrame::enter("outer");
            assert_eq!(current_frame_name(), Some("outer"));
            {
                let _inner = StackFrame::enter("inner");
                assert_eq!(current_frame_name(), Some("inner"));
            }
            assert_eq!(current_frame_name(), Some("outer"));
        }
        assert_eq!(current_frame_name(), None);
    }
}
