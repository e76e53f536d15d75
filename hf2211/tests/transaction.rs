//! End-to-end transactions against a mock indicator on localhost

use std::sync::Arc;
use std::time::{Duration, Instant};

use hf2211::{
    Command, DeviceDescriptor, DeviceList, FailureKind, PresetKind, Scale, TransactionResult,
};
use hf2211_core::{checksum, command::CLEAR_PRESET_TARE_FRAME};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Reply body framed with STX, LRC, ETX and CRLF
fn sealed(body: &str) -> Vec<u8> {
    let mut frame = vec![0x02];
    frame.extend_from_slice(body.as_bytes());
    let lrc = checksum::calculate(&frame, 1, frame.len());
    frame.extend_from_slice(lrc.as_bytes());
    frame.extend_from_slice(&[0x03, 0x0D, 0x0A]);
    frame
}

async fn read_n(stream: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).await.unwrap();
    buf
}

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn scale_at(port: u16) -> Scale {
    let devices = DeviceList::new(vec![
        DeviceDescriptor::new("bench", "127.0.0.1", port)
            .with_name("Bench scale")
            .as_default(),
    ]);
    Scale::new(Arc::new(devices))
}

#[tokio::test]
async fn weight_reading_over_tcp() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_n(&mut stream, Command::ReadWeight.frame().len()).await;
        assert_eq!(request, Command::ReadWeight.frame().to_vec());

        let reply = sealed(&format!("00FFr010722{:<11}{:<11}{}", "W 12.340", "T 00.340", "S004"));
        // split the reply to exercise accumulation
        stream.write_all(&reply[..20]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        stream.write_all(&reply[20..]).await.unwrap();

        // keep the socket open; the client closes once it has a result
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
    });

    let result = scale_at(port).read_weight(None).await;
    assert_eq!(result.device_id.as_deref(), Some("bench"));
    let TransactionResult::Weight(reading) = result.into_result() else {
        panic!("expected weight");
    };
    assert!(reading.lrc_valid);
    assert!((reading.net.unwrap() - 12.0).abs() < 1e-9);
    assert!(reading.flags.stable);
}

#[tokio::test]
async fn weight_reply_with_line_terminator_in_separate_segment() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_n(&mut stream, Command::ReadWeight.frame().len()).await;

        let reply = sealed(&format!("00FFr010722{:<11}{:<11}{}", "W 5.000", "T 1.000", "S004"));
        // everything up to and including ETX, then CR LF on its own
        stream.write_all(&reply[..41]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        stream.write_all(&reply[41..]).await.unwrap();

        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
    });

    let result = scale_at(port).read_weight(None).await.into_result();
    let TransactionResult::Weight(reading) = result else {
        panic!("expected weight");
    };
    assert!(reading.lrc_valid);
    assert!((reading.net.unwrap() - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn results_are_tagged_with_the_device() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_n(&mut stream, Command::ReadStatus.frame().len()).await;
        stream.write_all(&sealed("00FFr01000200")).await.unwrap();
    });

    let result = scale_at(port).read_status(None).await;
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["type"], "status");
    assert_eq!(json["deviceId"], "bench");
    assert_eq!(json["deviceName"], "Bench scale");

    // lookup failures never reach a device
    let json = serde_json::to_value(scale_at(port).read_status(Some("nope")).await).unwrap();
    assert_eq!(json["error"], "Device not found");
    assert!(json.get("deviceId").is_none());
}

#[tokio::test]
async fn successful_tare_clears_preset_on_same_connection() {
    let (listener, port) = bind().await;
    let (tx, mut rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_n(&mut stream, Command::Tare.frame().len()).await;
        stream.write_all(&sealed("00FFe1103000")).await.unwrap();

        let second = read_n(&mut stream, CLEAR_PRESET_TARE_FRAME.len()).await;
        tx.send(second).await.unwrap();
    });

    let result = scale_at(port).tare(Some("bench")).await;
    let TransactionResult::Tare(outcome) = result.into_result() else {
        panic!("expected tare");
    };
    assert!(outcome.success);
    assert_eq!(outcome.message, "tare executed successfully");

    let second = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, CLEAR_PRESET_TARE_FRAME);
}

#[tokio::test]
async fn preset_tare_frame_and_ack() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let expected = b"0230304646573031303830380000250003\r\n";
        let request = read_n(&mut stream, expected.len()).await;
        assert_eq!(&request[..], &expected[..]);
        stream.write_all(&sealed("00FFw0108000")).await.unwrap();
    });

    let result = scale_at(port).set_preset_tare(2.5, None).await.unwrap();
    let TransactionResult::Preset(outcome) = result.into_result() else {
        panic!("expected preset");
    };
    assert_eq!(outcome.kind, PresetKind::SetPreset);
    assert!(outcome.success);
}

#[tokio::test]
async fn silent_scale_times_out_after_two_seconds() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        // swallow the request, never answer, never close
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink).await;
    });

    let started = Instant::now();
    let result = scale_at(port).read_status(None).await;
    let elapsed = started.elapsed();

    let failure = result.as_failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(failure.message.contains("none"));
    assert!(elapsed >= Duration::from_millis(1900), "{elapsed:?}");
}

#[tokio::test]
async fn partial_reply_is_reported_in_timeout() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_n(&mut stream, Command::ReadWeight.frame().len()).await;
        stream.write_all(b"\x0200FF").await.unwrap();
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink).await;
    });

    let result = scale_at(port)
        .with_timeout(Duration::from_millis(300))
        .read_weight(None)
        .await;

    let failure = result.as_failure().unwrap();
    assert_eq!(failure.message, "No response from scale, raw: 0230304646");
}

#[tokio::test]
async fn refused_connection_fails_fast() {
    let (listener, port) = bind().await;
    drop(listener);

    let started = Instant::now();
    let result = scale_at(port).read_weight(None).await;

    let failure = result.as_failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Connection);
    assert!(!failure.message.is_empty());
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[tokio::test]
async fn peer_close_without_reply() {
    let (listener, port) = bind().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_n(&mut stream, Command::ReadStatus.frame().len()).await;
        // dropped: FIN without a reply
    });

    let result = scale_at(port).read_status(None).await;
    let failure = result.as_failure().unwrap();
    assert_eq!(failure.kind, FailureKind::InvalidResponse);
    assert_eq!(failure.message, "Connection closed without response");
}

#[tokio::test]
async fn concurrent_commands_open_separate_connections() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let mut handlers = Vec::new();
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().await.unwrap();
            handlers.push(tokio::spawn(async move {
                read_n(&mut stream, Command::ReadStatus.frame().len()).await;
                stream.write_all(&sealed("00FFr01000200")).await.unwrap();
            }));
        }
        for handler in handlers {
            handler.await.unwrap();
        }
    });

    let scale = scale_at(port);
    let (a, b) = tokio::join!(scale.read_status(None), scale.read_status(Some("bench")));
    assert_eq!(a.type_name(), "status");
    assert_eq!(b.type_name(), "status");

    server.await.unwrap();
}
