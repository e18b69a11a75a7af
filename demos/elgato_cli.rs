//! CLI application for controlling Elgato lights.
//!
//! This example demonstrates a command-line interface for controlling
//! Elgato lights using various commands.
//!
//! Run with: cargo run --example elgato_cli -- --help

use clap::{Parser, Subcommand};
use std::time::Duration;
use elgato_lights_rs::{DEFAULT_PORT, DiscoveryConfig, Light, LightStatus, discover};

#[derive(Parser)]
#[command(name = "elgato-cli")]
#[command(about = "Control Elgato lights from the command line", long_about = None)]
struct Cli {
    /// Address of the light (not required for discover command)
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// Port of the light's REST API
    #[arg(short, long, global = true, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover all Elgato lights on the network
    Discover {
        /// Discovery timeout in seconds (default: 5)
        #[arg(short, long, default_value = "5")]
        timeout: u64,

        /// Stop as soon as this many lights are found
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Get the current status of the light
    Status,

    /// Show the light's accessory info
    Info,

    /// Turn the light on
    On,

    /// Turn the light off
    Off,

    /// Toggle the light on/off
    Toggle,

    /// Set brightness (0-100)
    Brightness {
        /// Brightness level (0-100)
        level: i32,
    },

    /// Change brightness by a relative amount, clamped to 0-100
    Brighter {
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },

    /// Set color temperature in Kelvin (2900-7000)
    Temperature {
        /// Temperature in Kelvin (2900-7000)
        kelvin: i32,
    },

    /// Change color temperature by a relative amount, clamped to 2900-7000K
    Warmer {
        /// Kelvin to subtract (negative values make the light cooler)
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
}

fn print_status(status: &LightStatus) {
    println!("  Power: {}", if status.is_on() { "ON" } else { "OFF" });
    println!("  Brightness: {}%", status.brightness());
    println!("  Temperature: {}K", status.temperature());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    if let Commands::Discover { timeout, count } = cli.command {
        println!("Discovering Elgato lights (timeout: {}s)...", timeout);
        let mut config = DiscoveryConfig::new().timeout(Duration::from_secs(timeout));
        if let Some(count) = count {
            config = config.target_count(count);
        }

        let lights = discover(&config).await?;
        if lights.is_empty() {
            println!("No lights found.");
        } else {
            println!("Found {} light(s):", lights.len());
            for light in lights {
                println!("  {} (server {})", light, light.server());
            }
        }
        return Ok(());
    }

    let Some(address) = cli.address else {
        eprintln!("Error: --address is required for this command");
        std::process::exit(1);
    };
    let light = if cli.port == DEFAULT_PORT {
        Light::from_address(&address)
    } else {
        Light::new(&address, cli.port, &address, "")
    };

    let result = match cli.command {
        Commands::Discover { .. } => unreachable!(),
        Commands::Info => {
            let info = light.get_info().await?;
            println!("Accessory info for {}:", light);
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }
        Commands::Status => light.get_status().await,
        Commands::On => light.power_on().await,
        Commands::Off => light.power_off().await,
        Commands::Toggle => light.toggle().await,
        Commands::Brightness { level } => light.set_brightness(level).await,
        Commands::Brighter { delta } => light.increment_brightness(delta).await,
        Commands::Temperature { kelvin } => light.set_temperature(kelvin).await,
        Commands::Warmer { delta } => light.increment_temperature(-delta).await,
    };

    match result {
        Ok(status) => {
            println!("Status of {}:", light);
            print_status(&status);
        }
        Err(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}
