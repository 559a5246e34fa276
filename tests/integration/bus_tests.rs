//! Bus round trip over loopback TCP: client frame → I/O task → pipe →
//! service, then status telemetry back to the client.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use rpi_led::adapters::tcp_transport::TcpBus;
use rpi_led::adapters::time::MonotonicClock;
use rpi_led::app::commands::AppCommand;
use rpi_led::app::service::AppService;
use rpi_led::bus::channels::{PipeChannel, PipeMsg, RespChannel};
use rpi_led::bus::codec::{FrameDecoder, encode_frame};
use rpi_led::bus::io_task::{self, BusLinks};
use rpi_led::bus::router;
use rpi_led::bus::telemetry::{StatusPublisher, StatusTlm, decode_status};
use rpi_led::bus::transport::{BusTransport, MAX_CLIENTS};
use rpi_led::config::CtrlMode;

use crate::mock_hw::{MockGpio, RecordingSink, config};

const TIMEOUT: Duration = Duration::from_secs(5);

fn links() -> BusLinks {
    BusLinks {
        pipe: Box::leak(Box::new(PipeChannel::new())),
        resp: Box::leak(Box::new(RespChannel::new())),
    }
}

fn start_bus() -> (BusLinks, TcpStream) {
    let bus = TcpBus::bind("127.0.0.1:0").unwrap();
    let addr = bus.local_addr().unwrap();
    let links = links();
    io_task::spawn(bus, links).unwrap();

    let client = TcpStream::connect(addr).unwrap();
    client.set_read_timeout(Some(TIMEOUT)).unwrap();
    (links, client)
}

fn send_command(client: &mut TcpStream, cmd: AppCommand) {
    let mut buf = [0u8; 16];
    let n = encode_frame(&cmd.encode(), &mut buf).unwrap();
    client.write_all(&buf[..n]).unwrap();
}

fn next_msg(pipe: &PipeChannel) -> PipeMsg {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        if let Ok(msg) = pipe.try_receive() {
            return msg;
        }
        assert!(Instant::now() < deadline, "nothing arrived on the pipe");
        thread::sleep(Duration::from_millis(2));
    }
}

fn read_status(client: &mut TcpStream) -> StatusTlm {
    let mut decoder = FrameDecoder::new();
    let mut got = None;
    let mut buf = [0u8; 128];
    while got.is_none() {
        let n = client.read(&mut buf).unwrap();
        assert!(n > 0, "bus closed the connection");
        decoder.feed(&buf[..n], |p| got = Some(decode_status(p).unwrap()));
    }
    got.unwrap()
}

#[test]
fn command_then_status_round_trip() {
    let (links, mut client) = start_bus();
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Direct, 17), MockGpio::new(), &mut sink);
    let mut publisher = StatusPublisher::new(MonotonicClock::new());

    send_command(&mut client, AppCommand::TurnOn);
    let msg = next_msg(links.pipe);
    assert!(matches!(&msg, PipeMsg::Command { record, .. } if record[..] == [2]));
    router::route(msg, &mut svc, &mut sink, &mut publisher, links.resp);
    assert!(svc.build_status().led_on);

    router::route(PipeMsg::SendStatus, &mut svc, &mut sink, &mut publisher, links.resp);
    let tlm = read_status(&mut client);
    assert_eq!(tlm.seq, 0);
    assert!(tlm.status.led_on);
    assert!(tlm.status.is_mapped);
    assert_eq!(tlm.status.out_pin, 17);
    assert_eq!(tlm.status.valid_cmd_count, 1);
    assert_eq!(tlm.status.timing, None);
}

#[test]
fn pipelined_frames_arrive_in_order() {
    let (links, mut client) = start_bus();
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::new(), &mut sink);
    let mut publisher = StatusPublisher::new(MonotonicClock::new());

    // Three frames in one write, one of them malformed.
    let mut wire = Vec::new();
    for record in [
        AppCommand::SetOnTime(300).encode().to_vec(),
        vec![0xEE],
        AppCommand::SetOffTime(40).encode().to_vec(),
    ] {
        let mut buf = [0u8; 16];
        let n = encode_frame(&record, &mut buf).unwrap();
        wire.extend_from_slice(&buf[..n]);
    }
    client.write_all(&wire).unwrap();

    for _ in 0..3 {
        let msg = next_msg(links.pipe);
        router::route(msg, &mut svc, &mut sink, &mut publisher, links.resp);
    }
    router::route(PipeMsg::SendStatus, &mut svc, &mut sink, &mut publisher, links.resp);

    let tlm = read_status(&mut client);
    assert_eq!(tlm.status.valid_cmd_count, 2);
    assert_eq!(tlm.status.invalid_cmd_count, 1);
    let timing = tlm.status.timing.unwrap();
    assert_eq!((timing.on_time_ms, timing.off_time_ms), (300, 40));
}

#[test]
fn fifth_client_is_turned_away() {
    let mut bus = TcpBus::bind("127.0.0.1:0").unwrap();
    let addr = bus.local_addr().unwrap();

    let mut peers = Vec::new();
    let mut accepted = 0;
    for _ in 0..MAX_CLIENTS {
        peers.push(TcpStream::connect(addr).unwrap());
        let deadline = Instant::now() + TIMEOUT;
        while bus.try_accept().is_none() {
            assert!(Instant::now() < deadline, "client never accepted");
            thread::sleep(Duration::from_millis(1));
        }
        accepted += 1;
    }
    assert_eq!(accepted, MAX_CLIENTS);

    let mut extra = TcpStream::connect(addr).unwrap();
    extra.set_read_timeout(Some(TIMEOUT)).unwrap();
    let deadline = Instant::now() + Duration::from_millis(200);
    while Instant::now() < deadline {
        assert_eq!(bus.try_accept(), None);
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(bus.connected_count(), MAX_CLIENTS);

    // The rejected socket was closed on the server side.
    let mut byte = [0u8; 1];
    assert!(matches!(extra.read(&mut byte), Ok(0) | Err(_)));
}
