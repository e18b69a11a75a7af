//! Discover all Elgato lights on the network and turn them on.
//!
//! This example demonstrates:
//! - Discovery of Elgato lights on the local network
//! - Turning on every discovered light at a comfortable brightness
//!
//! Run with: cargo run --example discover_and_power_on

use std::time::Duration;
use elgato_lights_rs::{DiscoveryConfig, discover};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Discovering Elgato lights on the network...");

    let config = DiscoveryConfig::new().timeout(Duration::from_secs(5));
    let lights = discover(&config).await?;

    if lights.is_empty() {
        println!("No lights found on the network.");
        return Ok(());
    }

    println!("Found {} light(s):", lights.len());
    for light in &lights {
        println!("  - {}", light);
    }

    println!("\nTurning all lights on...");

    for light in &lights {
        match light.power_on().await {
            Ok(_) => println!("  ✓ Turned on {}", light.name()),
            Err(e) => eprintln!("  ✗ Failed to turn on {}: {}", light.name(), e),
        }
        if let Err(e) = light.set_brightness(40).await {
            eprintln!("  ✗ Failed to dim {}: {}", light.name(), e);
        }
    }

    println!("\nDone!");
    Ok(())
}
