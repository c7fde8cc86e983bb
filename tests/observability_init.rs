//! Global subscriber installation.
//!
//! Kept in its own test binary so the installed subscriber does not leak into other tests.

use canteen::observability::{self, LogFormat, ObservabilityError};

#[test]
fn subscriber_installs_once() {
    assert!(observability::init("debug", LogFormat::Json).is_ok());

    let second = observability::init("info", LogFormat::Compact);

    assert!(matches!(
        second,
        Err(ObservabilityError::TracingSubscriber(_))
    ));

    tracing::info!(check = "after init", "subscriber active");
}
