//! Read weight and status from one indicator

use std::sync::Arc;

use hf2211::{DeviceDescriptor, DeviceList, Scale, TransactionResult};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Change to your indicator's address
    let host = std::env::var("SCALE_HOST").unwrap_or_else(|_| "192.168.1.11".to_string());
    let port = std::env::var("SCALE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(9999);

    let devices = DeviceList::new(vec![DeviceDescriptor::new("scale1", host, port).as_default()]);
    let scale = Scale::new(Arc::new(devices));

    match scale.read_weight(None).await.into_result() {
        TransactionResult::Weight(w) => {
            println!("✓ Gross: {}  Tare: {}  Net: {:?}", w.gross.trim(), w.tare.trim(), w.net);
            println!("  Stable: {}  Overload: {}  LRC ok: {}", w.flags.stable, w.flags.overload, w.lrc_valid);
        }
        other => println!("✗ {:?}", other),
    }

    match scale.read_status(None).await.into_result() {
        TransactionResult::Status(s) => println!("✓ Status 0x{:02X}: {}", s.code, s.description),
        other => println!("✗ {:?}", other),
    }
}
