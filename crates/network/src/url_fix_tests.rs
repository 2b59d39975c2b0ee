use super::*;

#[test]
fn strips_trailing_slash_ci_slash() {
    assert_eq!(fix_ci_url("https://host/ci/"), "https://host");
}

#[test]
fn strips_trailing_ci_without_slash() {
    assert_eq!(fix_ci_url("https://host/ci"), "https://host");
}

#[test]
fn leaves_bare_host_unchanged() {
    assert_eq!(fix_ci_url("https://host"), "https://host");
}

#[test]
fn strips_bare_trailing_slash() {
    assert_eq!(fix_ci_url("https://host/"), "https://host");
}

#[test]
fn is_idempotent() {
    for url in ["https://host/ci/", "https://host/ci", "https://host", "https://host/"] {
        let once = fix_ci_url(url);
        let twice = fix_ci_url(&once);
        assert_eq!(once, twice);
    }
}

#[test]
fn does_not_touch_path_segments_that_merely_contain_ci() {
    assert_eq!(fix_ci_url("https://host/ci-runner"), "https://host/ci-runner");
}
