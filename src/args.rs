// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{fmt, time::Duration};

use clap::{Parser, ValueEnum};
use presencepub::{
    acquisition::AcquisitionConfig,
    ld2410::{AckPolicy, Setting},
    serial::SerialConfig,
    sink::topic,
};
use serde_json::json;
use tracing::level_filters::LevelFilter;
use zenoh::config::{Config, WhatAmI};

/// Module radio state applied during setup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RadioMode {
    Off,
    On,
}

impl fmt::Display for RadioMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RadioMode::Off => write!(f, "off"),
            RadioMode::On => write!(f, "on"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// serial device connected to the radar
    #[arg(long, env, default_value = "/dev/ttyS0")]
    pub device: String,

    /// serial baud rate
    #[arg(long, env, default_value = "256000")]
    pub baud_rate: u32,

    /// serial read timeout in milliseconds
    #[arg(long, env, default_value = "100")]
    pub read_timeout: u64,

    /// delay in milliseconds before retrying a failed radar setup
    #[arg(long, env, default_value = "1000")]
    pub retry_delay: u64,

    /// delay in milliseconds between measurement cycles
    #[arg(long, env, default_value = "20")]
    pub cycle_delay: u64,

    /// The module radio state applied during setup.
    #[arg(long, env, default_value = "off")]
    pub radio: RadioMode,

    /// Run background noise detection for this many milliseconds during
    /// setup.
    #[arg(long, env, value_parser = clap::value_parser!(i64).range(0..=0xFFFF))]
    pub auto_sensitivity: Option<i64>,

    /// How acknowledgements are judged: exact matches the reference
    /// firmware byte for byte, status only checks command word and status.
    #[arg(long, env, default_value = "exact")]
    pub ack_policy: AckPolicy,

    /// topic prefix, the radar publishes on <prefix>/radar
    #[arg(long, env, default_value = "rt/presence")]
    pub topic_prefix: String,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// Enable Tracy profiler broadcast
    #[arg(long, env)]
    pub tracy: bool,

    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    no_multicast_scouting: bool,
}

impl Args {
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.read_timeout),
        }
    }

    /// Settings applied inside the setup config session, in order.
    pub fn settings(&self) -> Vec<Setting> {
        let mut settings = vec![Setting::RadioMode(self.radio == RadioMode::On)];
        if let Some(duration) = self.auto_sensitivity {
            settings.push(Setting::AutoSensitivity(duration));
        }
        settings
    }

    pub fn acquisition_config(&self) -> AcquisitionConfig {
        AcquisitionConfig {
            topic: topic(&self.topic_prefix, "radar"),
            settings: self.settings(),
            retry_delay: Duration::from_millis(self.retry_delay),
            cycle_delay: Duration::from_millis(self.cycle_delay),
            tracy: self.tracy,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config::default();

        config
            .insert_json5("mode", &json!(args.mode).to_string())
            .unwrap();

        if !args.connect.is_empty() {
            config
                .insert_json5("connect/endpoints", &json!(args.connect).to_string())
                .unwrap();
        }

        if !args.listen.is_empty() {
            config
                .insert_json5("listen/endpoints", &json!(args.listen).to_string())
                .unwrap();
        }

        if args.no_multicast_scouting {
            config
                .insert_json5("scouting/multicast/enabled", &json!(false).to_string())
                .unwrap();
        }

        config
            .insert_json5("scouting/multicast/interface", &json!("lo").to_string())
            .unwrap();

        config
    }
}
