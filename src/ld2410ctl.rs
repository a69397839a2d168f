// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use log::debug;
use presencepub::{
    ld2410::{AckPolicy, ConfigOp, Radar, Setting},
    serial::{SerialChannel, SerialConfig, BAUD_RATE},
    Error,
};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial device to use
    #[arg(short, long, default_value = "/dev/ttyS0")]
    device: String,

    /// Serial baud rate
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud_rate: u32,

    /// Read timeout in milliseconds
    #[arg(short, long, default_value = "100")]
    timeout: u64,

    /// Monitor the radar and print reports.
    #[arg(short, long)]
    monitor: bool,

    /// How acknowledgements are judged
    #[arg(short, long, value_enum, default_value = "exact")]
    ack_policy: AckPolicy,

    /// Command to send to the device
    #[arg(short, long, value_enum)]
    command: Option<ConfigOp>,

    /// Command value: 0 or 1 for radio_mode, milliseconds for
    /// auto_sensitivity
    #[arg(allow_negative_numbers = true)]
    value: Option<i64>,
}

fn setting(command: ConfigOp, value: Option<i64>) -> Result<Setting, Error> {
    match (command, value) {
        (ConfigOp::FactoryReset, _) => Ok(Setting::FactoryReset),
        (ConfigOp::Restart, _) => Ok(Setting::Restart),
        (ConfigOp::RadioMode, Some(value @ (0 | 1))) => Ok(Setting::RadioMode(value == 1)),
        (ConfigOp::AutoSensitivity, Some(value)) => Ok(Setting::AutoSensitivity(value)),
        (command, value) => Err(Error::InvalidArgument(format!(
            "{:?} does not accept value {:?}",
            command, value
        ))),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = SerialConfig {
        device: args.device.clone(),
        baud_rate: args.baud_rate,
        timeout: Duration::from_millis(args.timeout),
    };
    debug!("opening serial device {}", config.device);
    let channel = SerialChannel::open(&config)?;

    let mut radar = Radar::new(channel, args.ack_policy, config.timeout);

    if let Some(command) = args.command {
        let acknowledged = match command {
            ConfigOp::EnableConfig => radar.enable_config().await?,
            ConfigOp::DisableConfig => radar.disable_config().await?,
            command => {
                let setting = setting(command, args.value)?;
                radar.flush().await?;
                radar.configure(&[setting]).await?
            }
        };
        println!("{:?}: {}", command, acknowledged);
    }

    if args.monitor {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                report = radar.read_report() => {
                    if let Some(report) = report? {
                        println!("{}", report);
                    }
                }
            }
        }
    }

    Ok(())
}
