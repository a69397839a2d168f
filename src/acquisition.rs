// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    error::Error,
    ld2410::{Radar, Setting},
    report::{SensorSnapshot, TelemetryReport},
    serial::Channel,
    sink::TelemetrySink,
};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, instrument, trace, warn, Instrument};
use tracy_client::{frame_mark, plot};

/// Acquisition state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    /// Device not yet configured
    Init,
    /// Waiting for the next report frame
    Measure,
    /// A report was decoded and is about to be published
    Publish(TelemetryReport),
}

/// Acquisition settings.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Topic the radar snapshot is published on.
    pub topic: String,
    /// Settings applied inside the config session during `Init`.
    pub settings: Vec<Setting>,
    /// Back-off before retrying a failed setup sequence.
    pub retry_delay: Duration,
    /// Delay between measurement cycles.
    pub cycle_delay: Duration,
    /// Emit Tracy plots and frame marks for each published report.
    pub tracy: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        AcquisitionConfig {
            topic: "rt/presence/radar".to_string(),
            settings: vec![Setting::RadioMode(false)],
            retry_delay: Duration::from_secs(1),
            cycle_delay: Duration::from_millis(20),
            tracy: false,
        }
    }
}

/// Drives a radar from setup through continuous report publishing.
///
/// `Init` runs the setup sequence until every step is acknowledged, after
/// which the machine alternates between `Measure` and `Publish` and never
/// returns to `Init` on its own.
pub struct Acquisition<C: Channel, S: TelemetrySink> {
    radar: Radar<C>,
    sink: S,
    config: AcquisitionConfig,
    state: State,
    snapshot: watch::Sender<SensorSnapshot>,
}

impl<C: Channel, S: TelemetrySink> Acquisition<C, S> {
    /// Creates a machine in `Init` with an undefined snapshot.
    pub fn new(radar: Radar<C>, sink: S, config: AcquisitionConfig) -> Self {
        let (snapshot, _) = watch::channel(SensorSnapshot::default());

        Acquisition {
            radar,
            sink,
            config,
            state: State::Init,
            snapshot,
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Latest snapshot, replaced as a whole on every decoded report.
    pub fn snapshot(&self) -> SensorSnapshot {
        *self.snapshot.borrow()
    }

    /// Receiver observing every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<SensorSnapshot> {
        self.snapshot.subscribe()
    }

    /// The driven radar.
    pub fn radar(&self) -> &Radar<C> {
        &self.radar
    }

    /// The telemetry sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs the setup sequence again on the next step.
    pub fn reset(&mut self) {
        self.state = State::Init;
    }

    /// Executes a single state transition and returns the new state.
    ///
    /// Channel failures propagate and leave the state unchanged.
    pub async fn step(&mut self) -> Result<State, Error> {
        let next = match self.state {
            State::Init => self.initialize().await?,
            State::Measure => self.measure().await?,
            State::Publish(report) => {
                self.publish(report).await;
                State::Measure
            }
        };

        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            trace!("{:?} -> {:?}", self.state, next);
        }

        self.state = next;
        Ok(next)
    }

    /// Steps until `cancel` fires or a step fails.
    ///
    /// Cancellation is checked after every step and during every delay.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), Error> {
        loop {
            let delay = match self.step().await? {
                State::Init => self.config.retry_delay,
                State::Measure => self.config.cycle_delay,
                State::Publish(_) => Duration::ZERO,
            };

            if cancel.is_cancelled() {
                break;
            }

            if !delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        info!("radar acquisition cancelled");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn initialize(&mut self) -> Result<State, Error> {
        self.radar.flush().await?;

        match self.radar.configure(&self.config.settings).await? {
            true => {
                info!("radar configured: {:?}", self.config.settings);
                Ok(State::Measure)
            }
            false => {
                warn!(
                    "radar setup failed, retrying in {:?}",
                    self.config.retry_delay
                );
                Ok(State::Init)
            }
        }
    }

    async fn measure(&mut self) -> Result<State, Error> {
        match self.radar.read_report().await? {
            Some(report) => {
                debug!("{}", report);
                Ok(State::Publish(report))
            }
            None => Ok(State::Measure),
        }
    }

    #[instrument(skip_all)]
    async fn publish(&mut self, report: TelemetryReport) {
        let snapshot = SensorSnapshot::from(report);
        self.snapshot.send_replace(snapshot);

        self.config.tracy.then(|| {
            plot!("moving energy", report.moving_energy as f64);
            plot!("stationary energy", report.stationary_energy as f64);
        });

        let payload = snapshot.to_json().to_string();
        let topic = &self.config.topic;
        let sink = &mut self.sink;

        let span = info_span!("radar_publish");
        async {
            match sink.publish(topic, &payload).await {
                Ok(_) => {}
                Err(e) => error!("{} publish error: {}", topic, e),
            }
        }
        .instrument(span)
        .await;

        self.config.tracy.then(frame_mark);
    }
}
