use deeplink_core::{
    spawn_inbound_pump, ChannelNames, HandlerId, LoopbackTransport, ProtocolRouter, RouteParams,
    RouterConfig,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

const REGISTRAR_THREADS: usize = 4;
const REGISTRATIONS_PER_THREAD: usize = 50;

#[test]
fn registrations_race_with_pumped_notifications() {
    let transport = Arc::new(LoopbackTransport::new());
    let router = Arc::new(ProtocolRouter::new(transport.clone()));
    router.init().expect("router init");

    let hits = Arc::new(AtomicUsize::new(0));
    let (pump_tx, pump) = spawn_inbound_pump(
        Arc::clone(&transport),
        router.config().channels.back_channel.as_str(),
    );

    let registrars: Vec<_> = (0..REGISTRAR_THREADS)
        .map(|thread_index| {
            let router = Arc::clone(&router);
            let hits = Arc::clone(&hits);
            let pump_tx = pump_tx.clone();
            thread::spawn(move || {
                let extension_id = format!("ext-{thread_index}");
                for _ in 0..REGISTRATIONS_PER_THREAD {
                    let hits = Arc::clone(&hits);
                    let handler_id = router.register_for_extension(
                        &extension_id,
                        "ext://race",
                        move |_: &RouteParams| {
                            hits.fetch_add(1, Ordering::SeqCst);
                        },
                    );
                    pump_tx
                        .send(json!({
                            "handlerType": "extension",
                            "extensionId": extension_id,
                            "handlerId": handler_id.as_str(),
                        }))
                        .expect("pump should accept notifications");
                }
            })
        })
        .collect();

    for registrar in registrars {
        registrar.join().expect("registrar thread");
    }
    drop(pump_tx);
    pump.join().expect("pump thread");

    assert_eq!(
        hits.load(Ordering::SeqCst),
        REGISTRAR_THREADS * REGISTRATIONS_PER_THREAD
    );
    assert_eq!(router.handler_counts().extension_partitions, REGISTRAR_THREADS);
}

#[test]
fn slow_handler_does_not_block_registration() {
    let transport = Arc::new(LoopbackTransport::new());
    let router = Arc::new(ProtocolRouter::new(transport.clone()));
    router.init().expect("router init");

    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = std::sync::Mutex::new(release_rx);
    let slow_id = router.register_internal("app://slow", move |_: &RouteParams| {
        let _ = entered_tx.send(());
        let _ = release_rx
            .lock()
            .expect("release lock")
            .recv_timeout(Duration::from_secs(5));
    });

    let (pump_tx, pump) = spawn_inbound_pump(
        Arc::clone(&transport),
        &router.config().channels.back_channel,
    );
    pump_tx
        .send(json!({ "handlerType": "internal", "handlerId": slow_id.as_str() }))
        .expect("pump send");
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("slow handler should start");

    // The slow handler is still running; registration must not wait for it.
    let quick_id = router.register_internal("app://quick", |_: &RouteParams| {});
    assert_ne!(quick_id, slow_id);
    assert_eq!(router.handler_counts().internal, 2);

    release_tx.send(()).expect("release slow handler");
    drop(pump_tx);
    pump.join().expect("pump thread");
}

#[test]
fn routers_on_separate_channels_do_not_cross_talk() {
    let transport = Arc::new(LoopbackTransport::new());
    let first = ProtocolRouter::with_config(
        transport.clone(),
        RouterConfig {
            channels: ChannelNames::with_prefix("first"),
        },
    );
    let second = ProtocolRouter::with_config(
        transport.clone(),
        RouterConfig {
            channels: ChannelNames::with_prefix("second"),
        },
    );
    first.init().expect("first init");
    second.init().expect("second init");

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let handler_id: HandlerId = first.register_internal("app://open", move |_: &RouteParams| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let notification = json!({ "handlerType": "internal", "handlerId": handler_id.as_str() });
    transport.emit("second:back-channel", &notification);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    transport.emit("first:back-channel", &notification);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(transport.sent("first:register").len(), 1);
    assert!(transport.sent("second:register").is_empty());
}
