//! The per-test diagnostic sink. Only the first reported error survives;
//! everything after it is noise once a test has already failed.

/// Captures at most one diagnostic for a single test execution.
pub struct ErrorSink {
    pub test_name: String,
    first_error: Option<String>,
}

impl ErrorSink {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            first_error: None,
        }
    }

    /// Records `message` as the test's failure, unless one was already
    /// recorded. Mirrors the original's `report_error`: first write wins.
    pub fn report_error(&mut self, message: impl Into<String>) {
        if self.first_error.is_some() {
            return;
        }
        self.first_error = Some(message.into());
    }

    pub fn is_panic(&self) -> bool {
        self.first_error.is_some()
    }

    pub fn first_error(&self) -> Option<&str> {
        self.first_error.as_deref()
    }

    pub fn into_first_error(self) -> Option<String> {
        self.first_error
    }
}
