//! Log records emitted by the back-channel dispatch path.
//!
//! Runs as its own test binary so the capturing logger below is the only
//! `log` backend. Everything lives in one test because the logger is global.

use deeplink_core::{LoopbackTransport, ProtocolRouter, RouteParams, BACK_CHANNEL};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl CaptureLogger {
    fn take_anomalies(&self) -> Vec<(Level, String)> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *records)
            .into_iter()
            .filter(|(level, _)| *level <= Level::Warn)
            .collect()
    }
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn emit_and_capture(transport: &LoopbackTransport, payload: &Value) -> Vec<(Level, String)> {
    CAPTURE.take_anomalies();
    transport.emit(BACK_CHANNEL, payload);
    CAPTURE.take_anomalies()
}

fn assert_single(records: &[(Level, String)], level: Level, fragments: &[&str]) {
    assert_eq!(records.len(), 1, "expected one record, got {records:?}");
    let (actual_level, message) = &records[0];
    assert_eq!(*actual_level, level, "unexpected level for `{message}`");
    for fragment in fragments {
        assert!(
            message.contains(fragment),
            "`{message}` should contain `{fragment}`"
        );
    }
}

#[test]
fn each_dropped_notification_is_logged_exactly_once() {
    log::set_logger(&CAPTURE).expect("capture logger should install once");
    log::set_max_level(LevelFilter::Trace);

    let transport = Arc::new(LoopbackTransport::new());
    let router = ProtocolRouter::new(transport.clone());
    router.init().expect("router init");

    let removed_id = router.register_for_extension("ext-1", "ext://action", |_: &RouteParams| {
        panic!("removed handler must not run");
    });
    router.remove_extension_handlers("ext-1");

    let records = emit_and_capture(
        &transport,
        &json!({
            "handlerType": "extension",
            "handlerId": removed_id.as_str(),
            "extensionId": "ext-1",
            "params": {}
        }),
    );
    assert_single(
        &records,
        Level::Error,
        &[
            "event=extension_handler_unknown",
            "extension_id=ext-1",
            removed_id.as_str(),
        ],
    );

    let records = emit_and_capture(
        &transport,
        &json!({
            "handlerType": "extension",
            "handlerId": "h1",
            "extensionId": "ext-2",
            "params": {}
        }),
    );
    assert_single(
        &records,
        Level::Error,
        &[
            "event=extension_handler_unknown",
            "extension_id=ext-2",
            "handler_id=h1",
        ],
    );

    let records = emit_and_capture(&transport, &json!({ "handlerType": "internal" }));
    assert_single(
        &records,
        Level::Warn,
        &[
            "event=notification_invalid",
            "channel=protocol-handler:back-channel",
            "handlerId",
        ],
    );

    let records = emit_and_capture(
        &transport,
        &json!({ "handlerType": "internal", "handlerId": "x", "extensionId": 7 }),
    );
    assert_single(
        &records,
        Level::Error,
        &["event=handler_unknown", "handler_id=x"],
    );

    let broken_id = router.register_internal("app://broken", |_: &RouteParams| {
        panic!("secret handler detail");
    });
    let records = emit_and_capture(
        &transport,
        &json!({ "handlerType": "internal", "handlerId": broken_id.as_str() }),
    );
    assert_single(
        &records,
        Level::Error,
        &["event=handler_panicked", broken_id.as_str()],
    );
    assert!(
        !records[0].1.contains("secret handler detail"),
        "panic text belongs to the panic hook record only"
    );
}
