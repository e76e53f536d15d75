//! Tare and preset tare on devices from a registry file

use std::sync::Arc;

use hf2211::{DeviceList, Scale};

#[tokio::main]
async fn main() -> hf2211::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // devices.json as written by the registry service
    let devices = match std::env::var("DEVICES_FILE") {
        Ok(path) => DeviceList::load(path)?,
        Err(_) => DeviceList::factory_default(),
    };
    let scale = Scale::new(Arc::new(devices));

    // Store a 1.25 kg preset tare
    let result = scale.set_preset_tare(1.25, None).await?;
    println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());

    // Tare the load (the preset is cleared on success)
    let result = scale.tare(None).await;
    println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());

    Ok(())
}
