// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use presencepub::{
    acquisition::Acquisition,
    ld2410::Radar,
    serial::SerialChannel,
    sink::ZenohSink,
};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};

#[cfg(feature = "profiling")]
#[global_allocator]
static GLOBAL: tracy_client::ProfiledAllocator<std::alloc::System> =
    tracy_client::ProfiledAllocator::new(std::alloc::System, 100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.tracy.then(tracy_client::Client::start);

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let tracy = match args.tracy {
        true => Some(tracing_tracy::TracyLayer::default().with_filter(args.rust_log)),
        false => None,
    };

    let subscriber = Registry::default()
        .with(stdout_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    let session = zenoh::open(args.clone())
        .await
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    let serial = args.serial_config();
    let channel = SerialChannel::open(&serial)?;
    info!(
        "radar on {} at {} baud, radio {}, {} ack policy",
        serial.device,
        serial.baud_rate,
        args.radio,
        args.ack_policy
    );

    let config = args.acquisition_config();
    info!("publishing radar telemetry on {}", config.topic);

    let radar = Radar::new(channel, args.ack_policy, serial.timeout);
    let mut acquisition = Acquisition::new(radar, ZenohSink::new(session), config);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupted"),
            _ = terminate.recv() => info!("terminated"),
        }
        shutdown.cancel();
    });

    match acquisition
        .run(cancel)
        .instrument(info_span!("radar"))
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("radar acquisition failed: {}", e);
            Err(e.into())
        }
    }
}
