#[test]
fn installs_subscriber_once() {
    assert!(story_report::logging::init("warn"));
    assert!(!story_report::logging::init("debug"));
}
