use std::thread;

use loramac_actor::{
    actor::{LinkCheckInfo, MacState},
    config::{
        device::{DeviceClass, JoinType},
        mac::{ActiveRegion, MacSettings, TxMode},
    },
    device::{JoinOutcome, MacDevice, ReceiveOutcome, SendOutcome},
    lorawan::{
        EventInfoStatus, LoRaMacStatus, McpsIndication, McpsRequest, McpsType, MibParam,
        MlmeIndication, MlmeRequest, Payload,
    },
    ActorError,
};
use proptest::prelude::*;

use mock::{abp_config, init_logger, otaa_config, settle, start, wait_for, MockEngine, MockRadio};

fn joined_device() -> (mock::TestDevice, MockEngine, MockRadio) {
    let (device, engine, radio) = start(abp_config());
    assert_eq!(device.join(JoinType::Abp).unwrap(), JoinOutcome::Succeeded);
    (device, engine, radio)
}

fn flushes(engine: &MockEngine) -> usize {
    engine
        .state()
        .mcps_requests
        .iter()
        .filter(|r| **r == McpsRequest::flush(0))
        .count()
}

#[test]
fn test_otaa_join_succeeds() {
    let (device, engine, _radio) = start(otaa_config());
    engine.state().auto_join = Some(EventInfoStatus::Ok);

    assert_eq!(device.join(JoinType::Otaa).unwrap(), JoinOutcome::Succeeded);
    assert!(device.is_joined());
    assert_eq!(device.state(), MacState::Idle);

    let state = engine.state();
    assert_eq!(
        state.mlme_requests,
        vec![MlmeRequest::Join {
            dev_eui: [0x01; 8],
            app_eui: [0x02; 8],
            app_key: [0x03; 16],
            datarate: 0,
        }]
    );
    assert_eq!(state.mib_sets.last(), Some(&MibParam::NetworkJoined(false)));
}

#[test]
fn test_otaa_join_rejected_by_network() {
    let (device, engine, _radio) = start(otaa_config());
    engine.state().auto_join = Some(EventInfoStatus::JoinFail);

    assert_eq!(device.join(JoinType::Otaa).unwrap(), JoinOutcome::Failed);
    assert!(!device.is_joined());
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_otaa_join_duty_cycle_restricted() {
    let (device, engine, _radio) = start(otaa_config());
    engine.state().mlme_status = LoRaMacStatus::DutyCycleRestricted;

    assert_eq!(device.join(JoinType::Otaa).unwrap(), JoinOutcome::Restricted);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_otaa_join_refused_by_engine() {
    let (device, engine, _radio) = start(otaa_config());
    engine.state().mlme_status = LoRaMacStatus::Busy;

    assert_eq!(device.join(JoinType::Otaa).unwrap(), JoinOutcome::Failed);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_second_join_while_busy() {
    let (device, engine, _radio) = start(otaa_config());

    thread::scope(|s| {
        let first = s.spawn(|| device.join(JoinType::Otaa).unwrap());
        wait_for(|| engine.join_requests() == 1);

        assert_eq!(device.state(), MacState::Busy);
        assert_eq!(device.join(JoinType::Otaa).unwrap(), JoinOutcome::Busy);
        assert_eq!(device.join(JoinType::Abp).unwrap(), JoinOutcome::Busy);

        engine.confirm_join(EventInfoStatus::Ok);
        assert_eq!(first.join().unwrap(), JoinOutcome::Succeeded);
    });

    assert_eq!(engine.join_requests(), 1);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_abp_join_programs_session() {
    let (device, engine, _radio) = joined_device();

    assert!(device.is_joined());
    assert_eq!(device.state(), MacState::Idle);

    let state = engine.state();
    assert!(state.mlme_requests.is_empty());
    assert!(state.mib_sets.ends_with(&[
        MibParam::NetworkJoined(false),
        MibParam::NetId(1),
        MibParam::DevAddr(0x2601_1BDA),
        MibParam::NwkSKey([0x04; 16]),
        MibParam::AppSKey([0x05; 16]),
        MibParam::NetworkJoined(true),
    ]));
}

#[test]
fn test_send_before_join() {
    let (device, engine, _radio) = start(otaa_config());

    assert_eq!(device.send(b"hello").unwrap(), SendOutcome::NotJoined);
    assert!(engine.state().mcps_requests.is_empty());
}

#[test]
fn test_send_rejects_oversized_payload() {
    let (device, _engine, _radio) = joined_device();

    let data = [0u8; 243];
    assert!(matches!(
        device.send(&data),
        Err(ActorError::PayloadTooLarge { len: 243 })
    ));
}

#[test]
fn test_confirmed_uplink_failure() {
    let (device, engine, _radio) = joined_device();

    assert_eq!(device.send(b"hello").unwrap(), SendOutcome::TxScheduled);
    assert_eq!(device.state(), MacState::Busy);
    assert_eq!(
        engine.state().mcps_requests,
        vec![McpsRequest::Confirmed {
            port: 2,
            payload: Payload::from_slice(b"hello").unwrap(),
            trials: 5,
            datarate: 0,
        }]
    );

    engine.confirm_uplink(McpsType::Confirmed, EventInfoStatus::Rx2Timeout);
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_unconfirmed_uplink_done() {
    let (device, engine, _radio) = joined_device();
    device.set_tx_mode(TxMode::Unconfirmed);
    device.set_tx_port(10);

    assert_eq!(device.send(&[1, 2, 3]).unwrap(), SendOutcome::TxScheduled);
    assert_eq!(engine.state().mcps_requests[0].kind(), McpsType::Unconfirmed);
    assert_eq!(engine.state().mcps_requests[0].port(), 10);

    engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::Ok);
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxDone);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_send_while_busy() {
    let (device, engine, _radio) = joined_device();

    assert_eq!(device.send(b"one").unwrap(), SendOutcome::TxScheduled);
    assert_eq!(device.send(b"two").unwrap(), SendOutcome::Busy);
    assert_eq!(device.join(JoinType::Abp).unwrap(), JoinOutcome::Busy);
    assert_eq!(engine.state().mcps_requests.len(), 1);
}

#[test]
fn test_downlink_with_data() {
    let (device, engine, _radio) = joined_device();
    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);

    engine.indicate(McpsIndication {
        port: 7,
        rx_data: true,
        ack_received: true,
        rssi: -70,
        rx_datarate: 3,
        payload: Payload::from_slice(b"pong").unwrap(),
        ..McpsIndication::default()
    });

    match device.receive().unwrap() {
        ReceiveOutcome::DataReceived(rx) => {
            assert_eq!(rx.payload.as_slice(), b"pong");
            assert_eq!(rx.port, 7);
            assert_eq!(rx.rssi, -70);
            assert_eq!(rx.datarate, 3);
            assert!(rx.ack);
            assert_eq!(device.rx_data(), rx);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_ack_without_data_is_tx_done() {
    let (device, engine, _radio) = joined_device();
    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);

    engine.confirm_uplink(McpsType::Confirmed, EventInfoStatus::Ok);
    engine.indicate(McpsIndication {
        ack_received: true,
        ..McpsIndication::default()
    });

    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxDone);
}

#[test]
fn test_frame_pending_triggers_one_flush() {
    let (device, engine, _radio) = joined_device();
    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);

    engine.indicate(McpsIndication {
        frame_pending: true,
        ..McpsIndication::default()
    });

    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxDone);
    settle(&device);
    assert_eq!(flushes(&engine), 1);
    assert_eq!(engine.state().mcps_requests.len(), 2);
}

#[test]
fn test_schedule_uplink_indication_triggers_one_flush() {
    let (device, engine, _radio) = joined_device();

    engine.indicate_mlme(MlmeIndication::ScheduleUplink);
    settle(&device);

    assert_eq!(flushes(&engine), 1);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_payload_too_long_for_datarate_is_flushed() {
    let (device, engine, _radio) = joined_device();
    engine.state().query_status = LoRaMacStatus::LengthError;

    assert_eq!(device.send(&[0xAA; 200]).unwrap(), SendOutcome::TxScheduled);
    assert_eq!(engine.state().mcps_requests, vec![McpsRequest::flush(0)]);
}

#[test]
fn test_uplink_rejected_by_engine_reopens_gate() {
    let (device, engine, _radio) = joined_device();
    engine.state().mcps_status = LoRaMacStatus::DutyCycleRestricted;

    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);
    assert_eq!(device.state(), MacState::Idle);
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
}

#[test]
fn test_receive_returns_outcome_of_current_uplink() {
    let (device, engine, _radio) = joined_device();
    device.set_tx_mode(TxMode::Unconfirmed);

    // One cycle raises two terminal events: the downlink, then the confirm
    assert_eq!(device.send(b"one").unwrap(), SendOutcome::TxScheduled);
    engine.indicate(McpsIndication {
        rx_data: true,
        port: 3,
        payload: Payload::from_slice(b"pong").unwrap(),
        ..McpsIndication::default()
    });
    engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::Ok);
    assert!(matches!(
        device.receive().unwrap(),
        ReceiveOutcome::DataReceived(_)
    ));

    assert_eq!(device.send(b"two").unwrap(), SendOutcome::TxScheduled);
    assert_eq!(device.state(), MacState::Busy);
    engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::TxTimeout);
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_extra_terminal_events_do_not_pile_up() {
    let (device, engine, _radio) = joined_device();
    device.set_tx_mode(TxMode::Unconfirmed);

    for _ in 0..40 {
        assert_eq!(device.send(b"data").unwrap(), SendOutcome::TxScheduled);
        engine.indicate(McpsIndication::default());
        engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::Ok);
        assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxDone);
    }

    assert_eq!(device.send(b"last").unwrap(), SendOutcome::TxScheduled);
    engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::Rx2Timeout);
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
}

#[test]
fn test_flush_completion_is_not_reported_to_next_uplink() {
    let (device, engine, _radio) = joined_device();
    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);
    engine.indicate(McpsIndication {
        frame_pending: true,
        ..McpsIndication::default()
    });
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxDone);

    // Confirm of the empty flush uplink
    engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::Ok);
    settle(&device);
    assert_eq!(device.state(), MacState::Idle);

    assert_eq!(device.send(b"next").unwrap(), SendOutcome::TxScheduled);
    engine.confirm_uplink(McpsType::Confirmed, EventInfoStatus::Error);
    assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
}

#[test]
fn test_uplink_events_do_not_end_a_join() {
    let (device, engine, _radio) = start(otaa_config());

    thread::scope(|s| {
        let join = s.spawn(|| device.join(JoinType::Otaa).unwrap());
        wait_for(|| engine.join_requests() == 1);

        engine.confirm_uplink(McpsType::Unconfirmed, EventInfoStatus::Ok);
        settle(&device);
        assert_eq!(device.state(), MacState::Busy);
        assert!(!join.is_finished());

        engine.confirm_join(EventInfoStatus::JoinFail);
        assert_eq!(join.join().unwrap(), JoinOutcome::Failed);
    });
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_uplink_outcome_goes_to_sending_thread() {
    let (device, engine, _radio) = joined_device();
    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);

    thread::scope(|s| {
        let other = s.spawn(|| device.receive().unwrap());

        engine.confirm_uplink(McpsType::Confirmed, EventInfoStatus::Rx2Timeout);
        assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
        assert!(!other.is_finished());

        // The other thread only sees downlinks outside an uplink cycle
        wait_for(|| {
            engine.indicate(McpsIndication {
                rx_data: true,
                port: 9,
                payload: Payload::from_slice(b"late").unwrap(),
                ..McpsIndication::default()
            });
            settle(&device);
            other.is_finished()
        });
        match other.join().unwrap() {
            ReceiveOutcome::DataReceived(rx) => assert_eq!(rx.port, 9),
            outcome => panic!("unexpected outcome {:?}", outcome),
        }
    });
}

#[test]
fn test_link_check() {
    let (device, engine, _radio) = joined_device();

    device.request_link_check().unwrap();
    settle(&device);
    assert_eq!(engine.state().mlme_requests, vec![MlmeRequest::LinkCheck]);
    assert_eq!(device.link_check(), None);

    engine.confirm_link_check(EventInfoStatus::Ok, 20, 3);
    settle(&device);
    assert_eq!(
        device.link_check(),
        Some(LinkCheckInfo {
            demod_margin: 20,
            nb_gateways: 3,
        })
    );

    // A new uplink invalidates the answer
    assert_eq!(device.send(b"ping").unwrap(), SendOutcome::TxScheduled);
    assert_eq!(device.link_check(), None);
}

#[test]
fn test_failed_link_check_leaves_nothing() {
    let (device, engine, _radio) = joined_device();

    device.request_link_check().unwrap();
    engine.confirm_link_check(EventInfoStatus::Rx2Timeout, 20, 3);
    settle(&device);

    assert_eq!(device.link_check(), None);
    assert_eq!(device.state(), MacState::Idle);
}

#[test]
fn test_engine_init_failure() {
    init_logger();
    let engine = MockEngine::new();
    engine.state().init_status = LoRaMacStatus::RegionNotSupported;

    let result = MacDevice::init(engine, MockRadio::new(), otaa_config());
    assert!(matches!(
        result,
        Err(ActorError::EngineInit(LoRaMacStatus::RegionNotSupported))
    ));
}

#[test]
fn test_init_pushes_settings() {
    init_logger();
    let engine = MockEngine::new();
    let settings = MacSettings {
        region: ActiveRegion::US915,
        datarate: 2,
        adr: true,
        ..MacSettings::default()
    };

    let _device =
        MacDevice::with_settings(engine.clone(), MockRadio::new(), otaa_config(), settings)
            .unwrap();

    let state = engine.state();
    assert_eq!(state.region, Some(ActiveRegion::US915));
    assert_eq!(
        state.mib_sets,
        vec![
            MibParam::ChannelsDatarate(2),
            MibParam::Adr(true),
            MibParam::PublicNetwork(true),
            MibParam::DeviceClass(DeviceClass::A),
        ]
    );
}

#[test]
fn test_setting_changes_reach_engine_before_next_command() {
    let (device, engine, _radio) = start(otaa_config());
    let initial = engine.state().mib_sets.len();

    device.set_datarate(5);
    device.set_class(DeviceClass::C);
    settle(&device);
    assert_eq!(engine.state().mib_sets.len(), initial);

    device.request_link_check().unwrap();
    settle(&device);

    let state = engine.state();
    assert_eq!(
        &state.mib_sets[initial..],
        &[
            MibParam::ChannelsDatarate(5),
            MibParam::Adr(false),
            MibParam::PublicNetwork(true),
            MibParam::DeviceClass(DeviceClass::C),
        ]
    );
    assert_eq!(device.settings().datarate, 5);
}

#[test]
fn test_identity_setters_apply_to_next_join() {
    let (device, engine, _radio) = start(otaa_config());
    engine.state().auto_join = Some(EventInfoStatus::Ok);
    device.set_dev_eui([0xAA; 8]);
    device.set_app_key([0xBB; 16]);

    assert_eq!(device.join(JoinType::Otaa).unwrap(), JoinOutcome::Succeeded);
    match &engine.state().mlme_requests[0] {
        MlmeRequest::Join {
            dev_eui, app_key, ..
        } => {
            assert_eq!(dev_eui, &[0xAA; 8]);
            assert_eq!(app_key, &[0xBB; 16]);
        }
        other => panic!("unexpected request {:?}", other),
    }
    assert_eq!(device.config().dev_eui, [0xAA; 8]);
}

#[test]
fn test_drop_stops_worker() {
    let (device, _engine, _radio) = start(otaa_config());
    let notifier = device.radio_notifier();

    drop(device);
    assert!(!notifier.interrupt());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_single_uplink_in_flight(attempts in 1usize..8, cycles in 1usize..4) {
        let (device, engine, _radio) = joined_device();

        for cycle in 0..cycles {
            prop_assert_eq!(device.send(b"data").unwrap(), SendOutcome::TxScheduled);
            for _ in 1..attempts {
                prop_assert_eq!(device.send(b"data").unwrap(), SendOutcome::Busy);
            }
            prop_assert_eq!(engine.state().mcps_requests.len(), cycle + 1);

            engine.confirm_uplink(McpsType::Confirmed, EventInfoStatus::Error);
            prop_assert_eq!(device.receive().unwrap(), ReceiveOutcome::TxConfirmFailed);
        }
    }
}
