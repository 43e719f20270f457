// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Behavioral tests for the device lifecycle: liveness, TTL expiry,
//! update application, and event delivery.
//!
//! TTL tests run on a paused tokio clock (`start_paused`), so sleeping
//! advances virtual time instantly and expiry timing is deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use shellr_lib::{Device, DeviceEvent, PayloadRecord, PropertySpec, StatusUpdate, Subscribable};
use tokio::time::sleep;

fn test_device() -> Device {
    Device::new("SHSW-1", "ABC123", "192.168.1.2")
}

/// Counts invocations of one callback kind.
fn counted<F>(register: F) -> Arc<AtomicU32>
where
    F: FnOnce(Box<dyn Fn() + Send + Sync>),
{
    let counter = Arc::new(AtomicU32::new(0));
    let clone = counter.clone();
    register(Box::new(move || {
        clone.fetch_add(1, Ordering::SeqCst);
    }));
    counter
}

// ============================================================================
// Liveness
// ============================================================================

mod liveness {
    use super::*;

    #[test]
    fn online_by_default() {
        assert!(test_device().online());
    }

    #[test]
    fn events_fire_once_per_transition() {
        let device = test_device();
        let online = counted(|f| {
            device.on_online(move |_| f());
        });
        let offline = counted(|f| {
            device.on_offline(move |_| f());
        });

        device.set_online(false);
        assert_eq!(online.load(Ordering::SeqCst), 0);
        assert_eq!(offline.load(Ordering::SeqCst), 1);

        device.set_online(false);
        assert_eq!(offline.load(Ordering::SeqCst), 1);

        device.set_online(true);
        assert_eq!(online.load(Ordering::SeqCst), 1);
        assert_eq!(offline.load(Ordering::SeqCst), 1);

        device.set_online(true);
        assert_eq!(online.load(Ordering::SeqCst), 1);
        assert_eq!(offline.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn liveness_listeners_receive_the_device() {
        let device = test_device();
        let seen = Arc::new(parking_lot::Mutex::new(String::new()));
        let seen_clone = seen.clone();
        device.on_offline(move |device| {
            *seen_clone.lock() = device.id().to_string();
        });

        device.set_online(false);
        assert_eq!(*seen.lock(), "ABC123");
    }
}

// ============================================================================
// TTL expiry
// ============================================================================

mod ttl {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expiry_takes_the_device_offline() {
        let device = test_device();

        device.set_ttl(Duration::from_millis(1000));
        sleep(Duration::from_millis(500)).await;
        assert!(device.online());

        sleep(Duration::from_millis(600)).await;
        assert!(!device.online());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_emits_offline_exactly_once() {
        let device = test_device();
        let offline = counted(|f| {
            device.on_offline(move |_| f());
        });

        device.set_ttl(Duration::from_millis(1000));
        sleep(Duration::from_millis(2500)).await;

        assert_eq!(offline.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cancels_a_pending_window() {
        let device = test_device();

        device.set_ttl(Duration::from_millis(1000));
        device.set_ttl(Duration::ZERO);
        assert_eq!(device.ttl(), Duration::ZERO);

        sleep(Duration::from_millis(2000)).await;
        assert!(device.online());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_restarts_the_window() {
        let device = test_device();

        device.set_ttl(Duration::from_millis(1000));
        sleep(Duration::from_millis(600)).await;

        // Re-arm past the original deadline; the superseded timer must
        // have no effect.
        device.set_ttl(Duration::from_millis(1000));
        sleep(Duration::from_millis(600)).await;
        assert!(device.online());

        sleep(Duration::from_millis(500)).await;
        assert!(!device.online());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_with_the_same_value_restarts_too() {
        let device = test_device();

        device.set_ttl(Duration::from_millis(1000));
        sleep(Duration::from_millis(900)).await;
        device.set_ttl(Duration::from_millis(1000));
        sleep(Duration::from_millis(900)).await;

        assert!(device.online());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_does_not_force_offline() {
        let device = test_device();
        device.set_online(false);

        device.set_ttl(Duration::ZERO);
        assert!(!device.online());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_device_fires_nothing() {
        let device = test_device();
        let mut events = device.subscribe();

        device.set_ttl(Duration::from_millis(1000));
        drop(device);

        sleep(Duration::from_millis(2000)).await;

        // The bus closed without ever delivering an offline event.
        assert!(matches!(
            events.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Closed)
        ));
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;

    #[test]
    fn default_and_write_round_trip() {
        let device = test_device();

        device.define_property("foo");
        assert!(device.property("foo").unwrap().is_null());

        device.set_property("foo", "bar").unwrap();
        assert_eq!(device.property("foo").unwrap().as_str(), Some("bar"));
    }

    #[test]
    fn validator_output_is_what_gets_stored() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_validator(|value| {
            Ok(value
                .as_str()
                .map(str::to_uppercase)
                .map_or(shellr_lib::PropertyValue::Null, Into::into))
        }));

        device.set_property("foo", "bar").unwrap();
        assert_eq!(device.property("foo").unwrap().as_str(), Some("BAR"));
    }

    #[test]
    fn same_value_writes_fire_once() {
        let device = test_device();
        device.define_property("foo");
        let changes = counted(|f| {
            device.on_change(move |_, _, _, _| f());
        });

        device.set_property("foo", "bar").unwrap();
        device.set_property("foo", "bar").unwrap();

        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn iteration_is_restricted_to_id_bearing_properties() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_id(1));
        device.define_property("bar");
        device.define_property(PropertySpec::new("baz").with_id(2));

        let mut seen: Vec<String> = device.id_properties().into_iter().map(|(n, _)| n).collect();
        seen.sort();

        assert_eq!(seen, vec!["baz".to_string(), "foo".to_string()]);
    }

    #[test]
    fn iteration_snapshots_are_restartable() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_id(1).with_default(1));

        let first: Vec<_> = (&device).into_iter().collect();
        let second: Vec<_> = (&device).into_iter().collect();
        assert_eq!(first, second);
    }
}

// ============================================================================
// Update application
// ============================================================================

mod updates {
    use super::*;

    #[test]
    fn empty_update_forces_online_once() {
        let device = test_device();
        device.set_online(false);
        let online = counted(|f| {
            device.on_online(move |_| f());
        });

        device.update(&StatusUpdate::new());
        assert!(device.online());
        assert_eq!(online.load(Ordering::SeqCst), 1);

        device.update(&StatusUpdate::new());
        assert_eq!(online.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn valid_for_sets_the_ttl_in_seconds() {
        let device = test_device();

        device.update(&StatusUpdate::new().with_valid_for(37));
        assert_eq!(device.ttl(), Duration::from_millis(37_000));

        // Absent validFor leaves the window untouched
        device.update(&StatusUpdate::new());
        assert_eq!(device.ttl(), Duration::from_millis(37_000));
    }

    #[tokio::test(start_paused = true)]
    async fn updates_keep_a_device_alive_until_they_stop() {
        let device = test_device();

        for _ in 0..3 {
            device.update(&StatusUpdate::new().with_valid_for(1));
            sleep(Duration::from_millis(700)).await;
            assert!(device.online());
        }

        sleep(Duration::from_millis(400)).await;
        assert!(!device.online());
    }

    #[test]
    fn duplicate_serial_refreshes_liveness_but_not_the_delta() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_id(1));
        let changes = counted(|f| {
            device.on_change(move |_, _, _, _| f());
        });

        let msg = StatusUpdate::new()
            .with_serial(123)
            .with_payload(vec![PayloadRecord::new(vec![0.into(), 1.into(), 2.into()])]);

        device.update(&msg);
        assert_eq!(device.property("foo").unwrap().as_int(), Some(2));
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        device.set_online(false);
        device.update(&msg);

        // Liveness refreshed both times; delta applied only on the first
        assert!(device.online());
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        device.update(&msg.clone().with_serial(124));
        assert_eq!(changes.load(Ordering::SeqCst), 1); // value unchanged, suppressed
        assert_eq!(device.last_serial(), Some(124));
    }

    #[test]
    fn host_delta_emits_its_change_event() {
        let device = test_device();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let seen_clone = seen.clone();
        device.on_property_changed(Device::HOST, move |new_value, _old, _device| {
            *seen_clone.lock() = new_value.as_str().map(str::to_string);
        });

        device.apply_update(&StatusUpdate::new().with_host("192.168.1.3"), &[]);

        assert_eq!(device.host(), "192.168.1.3");
        assert_eq!(seen.lock().as_deref(), Some("192.168.1.3"));
    }

    #[test]
    fn payload_records_address_properties_by_id() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_id(1));
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let seen_clone = seen.clone();
        device.on_property_changed("foo", move |new_value, _old, _device| {
            *seen_clone.lock() = Some(new_value.clone());
        });

        device.apply_update(
            &StatusUpdate::new(),
            &[PayloadRecord::new(vec![0.into(), 1.into(), 2.into()])],
        );

        assert_eq!(*seen.lock(), Some(shellr_lib::PropertyValue::Int(2)));
    }

    #[test]
    fn unknown_ids_are_tolerated() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_id(1));

        device.apply_update(
            &StatusUpdate::new(),
            &[
                PayloadRecord::new(vec![0.into(), 77.into(), "dropped".into()]),
                PayloadRecord::new(vec![0.into(), 1.into(), "kept".into()]),
            ],
        );

        assert_eq!(device.property("foo").unwrap().as_str(), Some("kept"));
    }

    #[test]
    fn update_decoded_from_wire_json() {
        let device = test_device();
        device.define_property(PropertySpec::new("switch").with_id(112));

        let msg: StatusUpdate = serde_json::from_str(
            r#"{"host": "192.168.1.3", "serial": 1, "validFor": 0, "payload": [[0, 112, true]]}"#,
        )
        .unwrap();
        // validFor of zero never arms a timer, so no runtime is needed
        device.update(&msg);

        assert_eq!(device.host(), "192.168.1.3");
        assert_eq!(device.property("switch").unwrap().as_bool(), Some(true));
    }
}

// ============================================================================
// Event delivery
// ============================================================================

mod events {
    use super::*;

    #[tokio::test]
    async fn bus_and_callbacks_observe_the_same_sequence() {
        let device = test_device();
        device.define_property(PropertySpec::new("foo").with_id(1));
        let mut rx = device.subscribe();

        let sync_seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sync_clone = sync_seen.clone();
        device.on_change(move |name, new_value, old_value, _device| {
            sync_clone.lock().push(DeviceEvent::PropertyChanged {
                property: name.to_string(),
                new_value: new_value.clone(),
                old_value: old_value.clone(),
            });
        });

        device.set_online(false);
        device.update(
            &StatusUpdate::new()
                .with_serial(1)
                .with_payload(vec![PayloadRecord::new(vec![0.into(), 1.into(), 2.into()])]),
        );

        // Async stream: offline (assignment), online (update), then the change
        assert_eq!(rx.recv().await.unwrap(), DeviceEvent::Offline);
        assert_eq!(rx.recv().await.unwrap(), DeviceEvent::Online);
        let change = rx.recv().await.unwrap();
        assert_eq!(change.property(), Some("foo"));

        // The synchronous listener saw the same change
        assert_eq!(sync_seen.lock().as_slice(), &[change]);
    }

    #[test]
    fn unsubscribed_listeners_stop_receiving() {
        let device = test_device();
        let offline = Arc::new(AtomicU32::new(0));
        let offline_clone = offline.clone();
        let id = device.on_offline(move |_| {
            offline_clone.fetch_add(1, Ordering::SeqCst);
        });

        device.set_online(false);
        assert_eq!(offline.load(Ordering::SeqCst), 1);

        assert!(device.unsubscribe(id));
        device.set_online(true);
        device.set_online(false);
        assert_eq!(offline.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_observe_the_new_state() {
        let device = test_device();
        let observed = Arc::new(parking_lot::Mutex::new(None));
        let observed_clone = observed.clone();
        device.on_offline(move |device| {
            // Re-entering the device from a listener is safe: dispatch
            // happens after the state lock is released.
            *observed_clone.lock() = Some(device.online());
        });

        device.set_online(false);
        assert_eq!(*observed.lock(), Some(false));
    }
}
