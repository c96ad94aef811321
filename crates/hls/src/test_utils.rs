/// Installs a tracing subscriber that writes through the test harness.
///
/// - `init_test_tracing!()` - uses DEBUG level (default)
/// - `init_test_tracing!(TRACE)` - uses specified level
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        init_test_tracing!(DEBUG);
    };
    ($level:ident) => {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::$level)
            .with_test_writer()
            .try_init();
    };
}
