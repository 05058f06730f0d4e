//! Assertion macros used inside a registered test body. Each formats a
//! descriptive diagnostic (line, test name, both source expressions and their
//! `Debug` values) into the test's [`ErrorSink`](crate::error_sink::ErrorSink)
//! and then returns early from the caller on first failure, mirroring the
//! original's `goto`/`return`-on-panic discipline.

/// Asserts `$expected == $actual`, recording a diagnostic and returning from
/// the enclosing function if they differ.
#[macro_export]
macro_rules! assert_eq_test {
    ($errors:expr, $expected:expr, $actual:expr) => {{
        let expected = &$expected;
        let actual = &$actual;
        if expected != actual {
            $errors.report_error(format!(
                "Test assert failed!\nLine: {}, Test: {}\nExpected: {} = {:?}\nActual: {} = {:?}",
                line!(),
                $errors.test_name,
                stringify!($expected),
                expected,
                stringify!($actual),
                actual,
            ));
        }
        if $errors.is_panic() {
            return;
        }
    }};
}

/// Asserts `$expected != $actual`, recording a diagnostic and returning from
/// the enclosing function if they are equal.
#[macro_export]
macro_rules! assert_ne_test {
    ($errors:expr, $expected:expr, $actual:expr) => {{
        let expected = &$expected;
        let actual = &$actual;
        if expected == actual {
            $errors.report_error(format!(
                "Test assert failed!\nLine: {}, Test: {}\n{} = {:?}\n{} = {:?}\nThese should not be equal",
                line!(),
                $errors.test_name,
                stringify!($expected),
                expected,
                stringify!($actual),
                actual,
            ));
        }
        if $errors.is_panic() {
            return;
        }
    }};
}

/// Asserts two slices are equal element-by-element, recording both sizes and
/// both contents on mismatch.
#[macro_export]
macro_rules! assert_arr_eq_test {
    ($errors:expr, $expected:expr, $actual:expr) => {{
        let expected: &[_] = &$expected;
        let actual: &[_] = &$actual;
        if expected != actual {
            $errors.report_error(format!(
                "Test assert failed!\nLine: {}, Test: {}\n\
                 Expected Size: {} = {}\nActual Size: {} = {}\n\
                 Expected Array: {} = {:?}\nActual Array: {} = {:?}",
                line!(),
                $errors.test_name,
                stringify!($expected.len()),
                expected.len(),
                stringify!($actual.len()),
                actual.len(),
                stringify!($expected),
                expected,
                stringify!($actual),
                actual,
            ));
        }
        if $errors.is_panic() {
            return;
        }
    }};
}

/// Asserts two string-likes are equal, recording both as quoted strings on
/// mismatch.
#[macro_export]
macro_rules! assert_str_eq_test {
    ($errors:expr, $expected:expr, $actual:expr) => {{
        let expected: &str = $expected.as_ref();
        let actual: &str = $actual.as_ref();
        if expected != actual {
            $errors.report_error(format!(
                "Test assert failed!\nLine: {}, Test: {}\n\
                 Expected String: {} = \"{}\"\nActual String: {} = \"{}\"",
                line!(),
                $errors.test_name,
                stringify!($expected),
                expected,
                stringify!($actual),
                actual,
            ));
        }
        if $errors.is_panic() {
            return;
        }
    }};
}

/// Unconditionally records a diagnostic and returns from the enclosing
/// function. Used for assertions that don't fit the equality-comparison
/// shape above.
#[macro_export]
macro_rules! report_error_test {
    ($errors:expr, $($arg:tt)*) => {{
        $errors.report_error(format!($($arg)*));
        return;
    }};
}

/// Returns from the enclosing function if a prior assertion already recorded
/// a failure. Lets a test bail out of further work after a non-assertion
/// check without duplicating the `is_panic` condition everywhere.
#[macro_export]
macro_rules! check_errors_test {
    ($errors:expr) => {
        if $errors.is_panic() {
            return;
        }
    };
}
