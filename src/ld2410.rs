// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    error::Error,
    frame::{
        decode_config_ack, decode_report_frame, encode_config_frame, ConfigAck, ConfigCommand,
        CONFIG_FOOTER, REPORT_TAIL,
    },
    report::TelemetryReport,
    serial::Channel,
};
use log::{debug, trace, warn};
use std::{fmt, time::Duration};

/// Upper bound on bytes collected while waiting for an acknowledgement.
/// Reports still streaming when config mode is requested are read first.
const MAX_ACK_READ: usize = 256;

/// Upper bound on bytes collected while waiting for a report frame.
const MAX_REPORT_READ: usize = 128;

/// Radio mode value enabling the module radio.
const RADIO_ON: u32 = 0x0100;
/// Radio mode value disabling the module radio.
const RADIO_OFF: u32 = 0x0000;

/// Configuration operations supported by the LD2410 firmware.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigOp {
    /// Enter config mode, required before any other configuration command
    EnableConfig = 0x00FF,
    /// Leave config mode and resume periodic reports
    DisableConfig = 0x00FE,
    /// Restore factory defaults
    FactoryReset = 0x00A2,
    /// Reboot the module, which also leaves config mode
    Restart = 0x00A3,
    /// Switch the module radio on or off
    RadioMode = 0x00A4,
    /// Background noise detection and sensitivity calibration
    AutoSensitivity = 0x000B,
}

impl ConfigOp {
    /// Command word sent on the wire.
    pub fn opcode(self) -> u16 {
        self as u16
    }

    /// Known-good acknowledgement as `length || payload`.
    pub fn expected_ack(self) -> &'static [u8] {
        match self {
            ConfigOp::EnableConfig => &[0x08, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x01, 0x00, 0x40, 0x00],
            ConfigOp::DisableConfig => &[0x04, 0x00, 0xFE, 0x01, 0x00, 0x00],
            ConfigOp::FactoryReset => &[0x04, 0x00, 0xA2, 0x01, 0x00, 0x00],
            ConfigOp::Restart => &[0x04, 0x00, 0xA3, 0x01, 0x00, 0x00],
            ConfigOp::RadioMode => &[0x04, 0x00, 0xA4, 0x01, 0x00, 0x00],
            ConfigOp::AutoSensitivity => &[0x04, 0x00, 0x0B, 0x01, 0x00, 0x00],
        }
    }
}

impl clap::ValueEnum for ConfigOp {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            ConfigOp::EnableConfig,
            ConfigOp::DisableConfig,
            ConfigOp::FactoryReset,
            ConfigOp::Restart,
            ConfigOp::RadioMode,
            ConfigOp::AutoSensitivity,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::EnableConfig => Some(clap::builder::PossibleValue::new("enable_config")),
            Self::DisableConfig => Some(clap::builder::PossibleValue::new("disable_config")),
            Self::FactoryReset => Some(clap::builder::PossibleValue::new("factory_reset")),
            Self::Restart => Some(clap::builder::PossibleValue::new("restart")),
            Self::RadioMode => Some(clap::builder::PossibleValue::new("radio_mode")),
            Self::AutoSensitivity => Some(clap::builder::PossibleValue::new("auto_sensitivity")),
        }
    }
}

/// How acknowledgements are judged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AckPolicy {
    /// Accept only a byte-for-byte match with [`ConfigOp::expected_ack`].
    /// Firmware revisions returning a different protocol version or buffer
    /// size on enable are rejected.
    #[default]
    Exact,
    /// Accept when the ack echoes the command word and reports zero status.
    /// Not yet validated against firmware other than the reference module.
    Status,
}

impl clap::ValueEnum for AckPolicy {
    fn value_variants<'a>() -> &'a [Self] {
        &[AckPolicy::Exact, AckPolicy::Status]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Exact => Some(clap::builder::PossibleValue::new("exact")),
            Self::Status => Some(clap::builder::PossibleValue::new("status")),
        }
    }
}

impl fmt::Display for AckPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AckPolicy::Exact => write!(f, "exact"),
            AckPolicy::Status => write!(f, "status"),
        }
    }
}

/// Device setting applied inside a config session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Setting {
    /// Restore factory defaults
    FactoryReset,
    /// Reboot the module, ending the session
    Restart,
    /// Radio on (`true`) or off
    RadioMode(bool),
    /// Calibration duration in milliseconds, `0..=0xFFFF`
    AutoSensitivity(i64),
}

impl Setting {
    /// Checks the setting's arguments without touching the device.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Setting::AutoSensitivity(duration) => check_duration(*duration),
            _ => Ok(()),
        }
    }
}

fn check_duration(duration: i64) -> Result<(), Error> {
    match (0..=0xFFFF).contains(&duration) {
        true => Ok(()),
        false => Err(Error::InvalidArgument(format!(
            "auto sensitivity duration {} outside 0..=65535",
            duration
        ))),
    }
}

/// LD2410 protocol engine bound to an exclusively owned channel.
pub struct Radar<C: Channel> {
    channel: C,
    policy: AckPolicy,
    timeout: Duration,
    dangling_session: bool,
}

impl<C: Channel> Radar<C> {
    /// Wraps `channel`, reading each answer for at most `timeout`.
    pub fn new(channel: C, policy: AckPolicy, timeout: Duration) -> Self {
        Radar {
            channel,
            policy,
            timeout,
            dangling_session: false,
        }
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Releases the underlying channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Discards any input pending on the channel.
    pub async fn flush(&mut self) -> Result<(), Error> {
        self.channel.clear().await
    }

    /// Enters config mode.
    pub async fn enable_config(&mut self) -> Result<bool, Error> {
        self.command(ConfigOp::EnableConfig, Some(0x0001)).await
    }

    /// Leaves config mode, resuming periodic reports.
    pub async fn disable_config(&mut self) -> Result<bool, Error> {
        self.command(ConfigOp::DisableConfig, None).await
    }

    /// Restores factory defaults. Requires config mode.
    pub async fn factory_reset(&mut self) -> Result<bool, Error> {
        self.command(ConfigOp::FactoryReset, None).await
    }

    /// Reboots the module. Requires config mode.
    pub async fn restart(&mut self) -> Result<bool, Error> {
        self.command(ConfigOp::Restart, None).await
    }

    /// Switches the module radio on or off. Requires config mode.
    pub async fn set_radio_mode(&mut self, on: bool) -> Result<bool, Error> {
        let value = if on { RADIO_ON } else { RADIO_OFF };
        self.command(ConfigOp::RadioMode, Some(value)).await
    }

    /// Starts background noise detection for `duration` milliseconds.
    ///
    /// Durations outside `0..=0xFFFF` are rejected before any I/O.
    pub async fn auto_sensitivity(&mut self, duration: i64) -> Result<bool, Error> {
        check_duration(duration)?;
        self.command(ConfigOp::AutoSensitivity, Some(duration as u32))
            .await
    }

    /// Enters config mode and returns a session which leaves it again.
    ///
    /// Returns `None` when the module did not acknowledge config mode.
    pub async fn session(&mut self) -> Result<Option<ConfigSession<'_, C>>, Error> {
        match self.enable_config().await? {
            true => Ok(Some(ConfigSession {
                radar: self,
                open: true,
            })),
            false => Ok(None),
        }
    }

    /// Applies `settings` inside a single config session.
    ///
    /// Settings are validated before config mode is entered. Stops at the
    /// first setting that is not acknowledged or fails; config mode is left
    /// in every case before returning. Returns true only if enable, every
    /// setting, and disable were all acknowledged.
    pub async fn configure(&mut self, settings: &[Setting]) -> Result<bool, Error> {
        for setting in settings {
            setting.validate()?;
        }

        let mut session = match self.session().await? {
            Some(session) => session,
            None => {
                warn!("config mode not acknowledged");
                return Ok(false);
            }
        };

        for setting in settings {
            match session.apply(*setting).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("{:?} not acknowledged", setting);
                    session.close().await?;
                    return Ok(false);
                }
                Err(err) => {
                    warn!("{:?} failed: {}", setting, err);
                    if let Err(close_err) = session.close().await {
                        warn!("leaving config mode failed: {}", close_err);
                    }
                    return Err(err);
                }
            }
        }

        session.close().await
    }

    /// Reads one report frame and decodes it.
    ///
    /// Timeouts, frames without a target payload and corrupted frames all
    /// yield `None`.
    pub async fn read_report(&mut self) -> Result<Option<TelemetryReport>, Error> {
        self.release_dangling_session().await?;

        let raw = self
            .channel
            .read_until(&REPORT_TAIL, MAX_REPORT_READ, self.timeout)
            .await?;

        let report = decode_report_frame(&raw).and_then(TelemetryReport::decode);
        if report.is_none() && !raw.is_empty() {
            trace!("no report in {:02X?}", raw);
        }

        Ok(report)
    }

    async fn command(&mut self, op: ConfigOp, value: Option<u32>) -> Result<bool, Error> {
        match op {
            ConfigOp::DisableConfig => self.dangling_session = false,
            _ => self.release_dangling_session().await?,
        }

        self.exchange(op, value).await
    }

    async fn release_dangling_session(&mut self) -> Result<(), Error> {
        if self.dangling_session {
            self.dangling_session = false;
            warn!("config session was not closed, leaving config mode");
            if !self.exchange(ConfigOp::DisableConfig, None).await? {
                warn!("disable config not acknowledged");
            }
        }
        Ok(())
    }

    async fn exchange(&mut self, op: ConfigOp, value: Option<u32>) -> Result<bool, Error> {
        debug!("{:?} {:?}", op, value);

        let frame = encode_config_frame(&ConfigCommand::new(op.opcode(), value));

        // Stale report bytes must not be mistaken for the acknowledgement.
        self.channel.clear().await?;
        self.channel.write(&frame).await?;

        let raw = self
            .channel
            .read_until(&CONFIG_FOOTER, MAX_ACK_READ, self.timeout)
            .await?;

        let accepted = match decode_config_ack(&raw) {
            Some(payload) => self.verify(op, payload),
            None => {
                debug!("{:?} no acknowledgement in {:02X?}", op, raw);
                false
            }
        };

        debug!("{:?} acknowledged: {}", op, accepted);
        Ok(accepted)
    }

    fn verify(&self, op: ConfigOp, payload: &[u8]) -> bool {
        trace!("{:?} ack payload: {:02X?}", op, payload);

        match self.policy {
            AckPolicy::Status => ConfigAck::parse(payload)
                .map(|ack| ack.accepts(op.opcode()))
                .unwrap_or(false),
            AckPolicy::Exact => {
                let expected = op.expected_ack();
                expected.len() == payload.len() + 2
                    && expected[..2] == (payload.len() as u16).to_le_bytes()
                    && expected[2..] == *payload
            }
        }
    }
}

/// An open config mode session.
///
/// [`ConfigSession::close`] leaves config mode. A session dropped without
/// being closed, for example when an error is propagated out of it, marks
/// the radar so that config mode is left before the next command or read.
pub struct ConfigSession<'a, C: Channel> {
    radar: &'a mut Radar<C>,
    open: bool,
}

impl<C: Channel> ConfigSession<'_, C> {
    /// See [`Radar::factory_reset`].
    pub async fn factory_reset(&mut self) -> Result<bool, Error> {
        self.radar.factory_reset().await
    }

    /// See [`Radar::set_radio_mode`].
    pub async fn set_radio_mode(&mut self, on: bool) -> Result<bool, Error> {
        self.radar.set_radio_mode(on).await
    }

    /// See [`Radar::auto_sensitivity`].
    pub async fn auto_sensitivity(&mut self, duration: i64) -> Result<bool, Error> {
        self.radar.auto_sensitivity(duration).await
    }

    /// Reboots the module. An acknowledged restart ends config mode on the
    /// device side, so closing the session afterwards sends nothing.
    pub async fn restart(&mut self) -> Result<bool, Error> {
        let restarted = self.radar.restart().await?;
        if restarted {
            self.open = false;
        }
        Ok(restarted)
    }

    /// Sends the command for `setting`.
    pub async fn apply(&mut self, setting: Setting) -> Result<bool, Error> {
        match setting {
            Setting::FactoryReset => self.factory_reset().await,
            Setting::Restart => self.restart().await,
            Setting::RadioMode(on) => self.set_radio_mode(on).await,
            Setting::AutoSensitivity(duration) => self.auto_sensitivity(duration).await,
        }
    }

    /// Leaves config mode, returning whether the module acknowledged it.
    ///
    /// If the disable command cannot be sent the radar stays marked and
    /// retries before its next command or read.
    pub async fn close(mut self) -> Result<bool, Error> {
        if !self.open {
            return Ok(true);
        }
        self.open = false;
        let closed = self.radar.disable_config().await;
        if closed.is_err() {
            self.radar.dangling_session = true;
        }
        closed
    }
}

impl<C: Channel> Drop for ConfigSession<'_, C> {
    fn drop(&mut self) {
        if self.open {
            self.radar.dangling_session = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frame::{CONFIG_HEADER, REPORT_HEAD},
        mock::MockChannel,
        report::TargetState,
    };

    fn command(opcode: u16, value: Option<u32>) -> Vec<u8> {
        encode_config_frame(&ConfigCommand::new(opcode, value))
    }

    fn ack(body: &[u8]) -> Vec<u8> {
        [&CONFIG_HEADER[..], body, &CONFIG_FOOTER[..]].concat()
    }

    fn radar(mock: MockChannel, policy: AckPolicy) -> Radar<MockChannel> {
        Radar::new(mock, policy, Duration::from_millis(100))
    }

    fn expect_op(mock: &mut MockChannel, op: ConfigOp, value: Option<u32>) {
        mock.expect(&command(op.opcode(), value), &ack(op.expected_ack()));
    }

    #[tokio::test]
    async fn test_enable_config() {
        for policy in [AckPolicy::Status, AckPolicy::Exact] {
            let mut mock = MockChannel::new();
            expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));

            let mut radar = radar(mock, policy);
            assert!(radar.enable_config().await.unwrap());

            let mock = radar.into_inner();
            assert_eq!(
                mock.sent()[0],
                [0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFF, 0x00, 0x01, 0x00, 0x04, 0x03, 0x02, 0x01]
            );
            assert_eq!(mock.clears(), 1);
        }
    }

    #[tokio::test]
    async fn test_every_template_accepted() {
        let ops = [
            (ConfigOp::DisableConfig, None),
            (ConfigOp::FactoryReset, None),
            (ConfigOp::Restart, None),
            (ConfigOp::RadioMode, Some(RADIO_OFF)),
            (ConfigOp::AutoSensitivity, Some(10)),
        ];

        for policy in [AckPolicy::Status, AckPolicy::Exact] {
            let mut mock = MockChannel::new();
            for (op, value) in ops {
                expect_op(&mut mock, op, value);
            }

            let mut radar = radar(mock, policy);
            assert!(radar.disable_config().await.unwrap());
            assert!(radar.factory_reset().await.unwrap());
            assert!(radar.restart().await.unwrap());
            assert!(radar.set_radio_mode(false).await.unwrap());
            assert!(radar.auto_sensitivity(10).await.unwrap());
            assert_eq!(radar.channel().remaining_expectations(), 0);
        }
    }

    #[tokio::test]
    async fn test_firmware_variant_ack() {
        // Same opcode and status, different protocol version and buffer size.
        let variant = ack(&[0x08, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x02, 0x00, 0x20, 0x00]);

        let mut mock = MockChannel::new();
        mock.expect(&command(0x00FF, Some(1)), &variant);
        let mut status = radar(mock, AckPolicy::Status);
        assert!(status.enable_config().await.unwrap());

        let mut mock = MockChannel::new();
        mock.expect(&command(0x00FF, Some(1)), &variant);
        let mut exact = radar(mock, AckPolicy::Exact);
        assert!(!exact.enable_config().await.unwrap());

        // Byte-exact matching unless status checking is asked for.
        let mut mock = MockChannel::new();
        mock.expect(&command(0x00FF, Some(1)), &variant);
        let mut unset = radar(mock, AckPolicy::default());
        assert!(!unset.enable_config().await.unwrap());
    }

    #[tokio::test]
    async fn test_ack_mismatch() {
        let mut mock = MockChannel::new();
        // Non-zero status.
        mock.expect(
            &command(0x00A4, Some(RADIO_ON)),
            &ack(&[0x04, 0x00, 0xA4, 0x01, 0x01, 0x00]),
        );
        // Acknowledges a different command.
        mock.expect(
            &command(0x00A2, None),
            &ack(&[0x04, 0x00, 0xA3, 0x01, 0x00, 0x00]),
        );

        let mut radar = radar(mock, AckPolicy::Status);
        assert!(!radar.set_radio_mode(true).await.unwrap());
        assert!(!radar.factory_reset().await.unwrap());
    }

    #[tokio::test]
    async fn test_ack_behind_report() {
        let mut raw = vec![
            0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, REPORT_HEAD, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x55, 0x00, 0xF8, 0xF7, 0xF6, 0xF5,
        ];
        raw.extend(ack(ConfigOp::EnableConfig.expected_ack()));

        let mut mock = MockChannel::new();
        mock.expect(&command(0x00FF, Some(1)), &raw);

        let mut radar = radar(mock, AckPolicy::Exact);
        assert!(radar.enable_config().await.unwrap());
    }

    #[tokio::test]
    async fn test_no_response() {
        let mut radar = radar(MockChannel::new(), AckPolicy::Status);
        assert!(!radar.disable_config().await.unwrap());

        // Truncated acknowledgement.
        let mut mock = MockChannel::new();
        mock.expect(&command(0x00FE, None), &[0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFE]);
        let mut radar = self::radar(mock, AckPolicy::Status);
        assert!(!radar.disable_config().await.unwrap());
    }

    #[tokio::test]
    async fn test_auto_sensitivity_range() {
        let mut radar = radar(MockChannel::new(), AckPolicy::Status);

        for duration in [-1, 0x10000] {
            match radar.auto_sensitivity(duration).await {
                Err(Error::InvalidArgument(_)) => {}
                other => panic!("expected InvalidArgument, got {:?}", other),
            }
        }

        let mock = radar.into_inner();
        assert!(mock.sent().is_empty());
        assert_eq!(mock.clears(), 0);
    }

    #[tokio::test]
    async fn test_auto_sensitivity_frame() {
        let mut mock = MockChannel::new();
        mock.expect(
            &[
                0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0x0B, 0x00, 0x88, 0x13, 0x04, 0x03, 0x02, 0x01,
            ],
            &ack(ConfigOp::AutoSensitivity.expected_ack()),
        );
        let mut radar = radar(mock, AckPolicy::Status);
        assert!(radar.auto_sensitivity(5000).await.unwrap());
    }

    #[tokio::test]
    async fn test_radio_mode_frames() {
        assert_eq!(
            command(ConfigOp::RadioMode.opcode(), Some(RADIO_ON)),
            [0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xA4, 0x00, 0x00, 0x01, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(
            command(ConfigOp::RadioMode.opcode(), Some(RADIO_OFF)),
            [0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xA4, 0x00, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[tokio::test]
    async fn test_configure() {
        let mut mock = MockChannel::new();
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));
        expect_op(&mut mock, ConfigOp::RadioMode, Some(RADIO_OFF));
        expect_op(&mut mock, ConfigOp::DisableConfig, None);

        let mut radar = radar(mock, AckPolicy::Status);
        assert!(radar.configure(&[Setting::RadioMode(false)]).await.unwrap());
        assert_eq!(radar.channel().sent().len(), 3);
        assert_eq!(radar.channel().remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn test_configure_rejected_setting_still_disables() {
        let mut mock = MockChannel::new();
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));
        mock.expect(
            &command(0x00A2, None),
            &ack(&[0x04, 0x00, 0xA2, 0x01, 0x01, 0x00]),
        );
        expect_op(&mut mock, ConfigOp::DisableConfig, None);

        let mut radar = radar(mock, AckPolicy::Status);
        let settings = [Setting::FactoryReset, Setting::RadioMode(true)];
        assert!(!radar.configure(&settings).await.unwrap());

        let mock = radar.into_inner();
        assert_eq!(mock.remaining_expectations(), 0);
        assert_eq!(mock.sent().last().unwrap(), &command(0x00FE, None));
    }

    #[tokio::test]
    async fn test_configure_enable_rejected() {
        let mut radar = radar(MockChannel::new(), AckPolicy::Status);
        assert!(!radar.configure(&[Setting::RadioMode(false)]).await.unwrap());
        // Only the enable attempt went out.
        assert_eq!(radar.channel().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_configure_invalid_setting() {
        let mut radar = radar(MockChannel::new(), AckPolicy::Status);

        let settings = [Setting::RadioMode(false), Setting::AutoSensitivity(-5)];
        let result = radar.configure(&settings).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        // Rejected before config mode was entered.
        assert!(radar.channel().sent().is_empty());
    }

    #[tokio::test]
    async fn test_configure_failed_setting_disables() {
        let mut mock = MockChannel::new();
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));
        // Scripted for a different frame, so the radio mode write fails.
        mock.expect(&command(0x00A2, None), &[]);
        expect_op(&mut mock, ConfigOp::DisableConfig, None);
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));

        let mut radar = radar(mock, AckPolicy::Status);
        let result = radar.configure(&[Setting::RadioMode(true)]).await;
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(radar.channel().sent().len(), 3);
        assert_eq!(radar.channel().sent()[2], command(0x00FE, None));

        // Nothing left to release before the next command.
        assert!(radar.enable_config().await.unwrap());
        assert_eq!(radar.channel().sent().len(), 4);
        assert_eq!(radar.channel().remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn test_dropped_session_released() {
        let mut mock = MockChannel::new();
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));
        expect_op(&mut mock, ConfigOp::DisableConfig, None);
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));

        let mut radar = radar(mock, AckPolicy::Status);

        {
            let mut session = radar.session().await.unwrap().unwrap();
            // The argument error propagates out of the open session.
            let result = session.auto_sensitivity(-5).await;
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }
        assert_eq!(radar.channel().sent().len(), 1);

        // Config mode is left before the next command goes out.
        assert!(radar.enable_config().await.unwrap());
        let mock = radar.into_inner();
        assert_eq!(mock.sent()[1], command(0x00FE, None));
        assert_eq!(mock.sent()[2], command(0x00FF, Some(1)));
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn test_restart_ends_session() {
        let mut mock = MockChannel::new();
        expect_op(&mut mock, ConfigOp::EnableConfig, Some(1));
        expect_op(&mut mock, ConfigOp::Restart, None);

        let mut radar = radar(mock, AckPolicy::Status);
        assert!(radar.configure(&[Setting::Restart]).await.unwrap());
        // No disable after the reboot.
        assert_eq!(radar.channel().sent().len(), 2);
    }

    #[tokio::test]
    async fn test_unplugged() {
        let mut mock = MockChannel::new();
        mock.unplug();

        let mut radar = radar(mock, AckPolicy::Status);
        assert!(matches!(radar.enable_config().await, Err(Error::Io(_))));
        assert!(matches!(radar.read_report().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_read_report() {
        let mut mock = MockChannel::new();
        mock.push_read(&[
            0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA, 0x02, 0x00, 0x00, 0x00, 0x2C, 0x01,
            0x3C, 0x2C, 0x01, 0x55, 0x00, 0xF8, 0xF7, 0xF6, 0xF5,
        ]);
        mock.push_read(&[0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA, 0x02]);

        let mut radar = radar(mock, AckPolicy::Status);

        let report = radar.read_report().await.unwrap().unwrap();
        assert_eq!(report.target_state, TargetState::Stationary);
        assert_eq!(report.stationary_distance, 300);
        assert_eq!(report.stationary_energy, 60);
        assert_eq!(report.detection_distance, 300);

        assert!(radar.read_report().await.unwrap().is_none());
        assert!(radar.read_report().await.unwrap().is_none());
    }
}
