//! Compile-time test registration via `linkme::distributed_slice`. No runtime
//! discovery step, no `ctor`-style static-init side effects: the linker
//! assembles the slice before `main` runs, and it is never mutated after.

use linkme::distributed_slice;

use crate::context::OpaqueContext;
use crate::error_sink::ErrorSink;

pub type TestFn = fn(&mut ErrorSink, OpaqueContext<'_>);

/// One registered test: its name, an optional context tag (empty string means
/// "no context"), and the function to run.
pub struct TestEntry {
    pub test_name: &'static str,
    pub context_name: &'static str,
    pub test_fn: TestFn,
}

#[distributed_slice]
pub static TEST_REGISTRY: [TestEntry] = [..];

/// All registered tests, in link order. Iteration order over this slice
/// defines the stable test ids sent over the wire, since the driver and the
/// runner are always the same binary and therefore share one registry.
pub fn all_tests() -> &'static [TestEntry] {
    &TEST_REGISTRY
}

/// Registers a test function under `$name` with no context, or under `$name`
/// tagged with `$context` when a context argument is given.
///
/// ```ignore
/// register_test!("module::adds_up", |errors, _ctx| {
///     assert_eq_test!(errors, 2 + 2, 4);
/// });
/// register_test!("module::uses_context", context = "counter", |errors, ctx| {
///     assert_eq_test!(errors, ctx.data.len(), 4);
/// });
/// ```
#[macro_export]
macro_rules! register_test {
    ($name:expr, $fn:expr) => {
        $crate::register_test!($name, context = "", $fn);
    };
    ($name:expr, context = $context:expr, $fn:expr) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::registry::TEST_REGISTRY)]
            static ENTRY: $crate::registry::TestEntry = $crate::registry::TestEntry {
                test_name: $name,
                context_name: $context,
                test_fn: $fn,
            };
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    register_test!("registry::trivially_passes", |_errors, _ctx| {});
    register_test!(
        "registry::reads_its_context",
        context = "bytes",
        |errors, ctx| {
            if ctx.data != [1, 2, 3] {
                errors.report_error("context mismatch");
            }
        }
    );

    #[test]
    fn registered_tests_are_discoverable() {
        let names: Vec<_> = all_tests().iter().map(|t| t.test_name).collect();
        assert!(names.contains(&"registry::trivially_passes"));
        assert!(names.contains(&"registry::reads_its_context"));
    }

    #[test]
    fn context_tagged_entry_carries_its_tag() {
        let entry = all_tests()
            .iter()
            .find(|t| t.test_name == "registry::reads_its_context")
            .unwrap();
        assert_eq!(entry.context_name, "bytes");
    }
}
