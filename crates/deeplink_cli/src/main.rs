//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `deeplink_core` linkage and router wiring without a hub process.
//! - Walk the register / notify / unload flow over the loopback transport.
//! - Keep output deterministic apart from minted handler ids.

use deeplink_core::{
    default_log_level, init_logging, LoopbackTransport, ProtocolRouter, RouteParams, BACK_CHANNEL,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

const LOG_DIR_ENV: &str = "DEEPLINK_LOG_DIR";
const LOG_LEVEL_ENV: &str = "DEEPLINK_LOG_LEVEL";
const DEFAULT_LOG_DIR_NAME: &str = "deeplink-logs";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

fn main() {
    println!("deeplink_core ping={}", deeplink_core::ping());
    println!("deeplink_core version={}", deeplink_core::core_version());

    let log_dir = resolve_log_dir();
    let level = resolve_log_level();
    match init_logging(&level, &log_dir.to_string_lossy()) {
        Ok(()) => println!("logging level={level} dir={}", log_dir.display()),
        Err(err) => println!("logging disabled: {err}"),
    }

    let transport = Arc::new(LoopbackTransport::new());
    let router = ProtocolRouter::new(transport.clone());
    if let Err(err) = router.init() {
        println!("router init failed: {err}");
        return;
    }

    let received = Arc::new(Mutex::new(Vec::<String>::new()));

    let sink = Arc::clone(&received);
    let open_id = router.register_internal("app://open/{id}", move |params: &RouteParams| {
        if let Ok(mut received) = sink.lock() {
            received.push(format!("internal open params={params:?}"));
        }
    });

    let sink = Arc::clone(&received);
    let action_id =
        router.register_for_extension("ext-1", "ext://action", move |_: &RouteParams| {
            if let Ok(mut received) = sink.lock() {
                received.push("extension ext-1 action".to_string());
            }
        });

    for message in transport.take_sent() {
        println!("sent channel={} payload={}", message.channel, message.payload);
    }

    let notifications = [
        json!({ "handlerType": "internal", "handlerId": open_id.as_str(), "params": { "id": "42" } }),
        json!({ "handlerType": "extension", "handlerId": action_id.as_str(), "extensionId": "ext-1" }),
        json!({ "handlerType": "extension", "handlerId": action_id.as_str(), "extensionId": "ext-2" }),
        json!({ "handlerType": "internal" }),
    ];
    for notification in &notifications {
        let outcome = router.dispatcher().on_notification(notification);
        println!("notify outcome={outcome:?}");
    }

    router.remove_extension_handlers("ext-1");
    let outcome = router.dispatcher().on_notification(&notifications[1]);
    println!("notify after unload outcome={outcome:?}");

    let reached = transport.emit(BACK_CHANNEL, &notifications[0]);
    println!("back channel listeners reached={reached}");

    if let Ok(received) = received.lock() {
        for line in received.iter() {
            println!("handled {line}");
        }
    }
    let counts = router.handler_counts();
    println!(
        "handlers internal={} extension_partitions={}",
        counts.internal, counts.extension_partitions
    );
}

fn resolve_log_dir() -> PathBuf {
    LOG_DIR
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(LOG_DIR_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)
        })
        .clone()
}

fn resolve_log_level() -> String {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default_log_level().to_string())
}
