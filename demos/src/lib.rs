//! Example registered tests exercising the harness end to end: an always-pass
//! pair, an assertion failure, a panic, an infinite loop (for timeout
//! classification), and a context-consuming test with both a matching and a
//! missing context.

use proctest_core::{assert_eq_test, register_test};

register_test!("demos::a_passes", |_errors, _ctx| {});
register_test!("demos::b_passes", |_errors, _ctx| {});

register_test!("demos::assertion_fails", |errors, _ctx| {
    assert_eq_test!(errors, 1, 2);
});

register_test!("demos::panics", |_errors, _ctx| {
    panic!("boom");
});

register_test!("demos::loops_forever", |_errors, _ctx| {
    loop {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
});

register_test!("demos::reads_int_context", context = "Int", |errors, ctx| {
    assert_eq_test!(errors, ctx.data.len(), 4);
    let value = u32::from_le_bytes(ctx.data[..4].try_into().unwrap());
    assert_eq_test!(errors, value, 0x1234);
});

/// No-op beyond forcing this crate to actually be linked into a binary that
/// otherwise never names it: `register_test!` entries live in a
/// `linkme`-collected section that only survives linking if something in the
/// crate is reachable from `main`.
pub fn ensure_linked() {}

#[cfg(test)]
mod tests {
    use proctest_core::all_tests;

    #[test]
    fn every_demo_test_is_registered() {
        let names: Vec<_> = all_tests().iter().map(|t| t.test_name).collect();
        for expected in [
            "demos::a_passes",
            "demos::b_passes",
            "demos::assertion_fails",
            "demos::panics",
            "demos::loops_forever",
            "demos::reads_int_context",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }
}
