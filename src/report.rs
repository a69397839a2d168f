// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::fmt;

/// Length of the target payload carried by a basic report frame.
pub const REPORT_PAYLOAD_LEN: usize = 9;

/// Target state byte of a report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing detected
    NoTarget,
    /// Moving target only
    Moving,
    /// Stationary target only
    Stationary,
    /// Both moving and stationary targets
    MovingAndStationary,
    /// Background noise detection in progress
    NoiseDetection,
    /// Background noise detection succeeded
    NoiseDetectionSuccess,
    /// Background noise detection failed
    NoiseDetectionFail,
    /// Any other state byte
    Unknown(u8),
}

impl From<u8> for TargetState {
    fn from(value: u8) -> Self {
        match value {
            0 => TargetState::NoTarget,
            1 => TargetState::Moving,
            2 => TargetState::Stationary,
            3 => TargetState::MovingAndStationary,
            4 => TargetState::NoiseDetection,
            5 => TargetState::NoiseDetectionSuccess,
            6 => TargetState::NoiseDetectionFail,
            value => TargetState::Unknown(value),
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetState::NoTarget => write!(f, "no_target"),
            TargetState::Moving => write!(f, "moving"),
            TargetState::Stationary => write!(f, "stationary"),
            TargetState::MovingAndStationary => write!(f, "moving_and_stationary"),
            TargetState::NoiseDetection => write!(f, "noise_detection"),
            TargetState::NoiseDetectionSuccess => write!(f, "noise_detection_success"),
            TargetState::NoiseDetectionFail => write!(f, "noise_detection_fail"),
            TargetState::Unknown(_) => write!(f, "unknown"),
        }
    }
}

/// Decoded presence report.
///
/// Distances are in centimetres, energies are 0-100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReport {
    /// Reported target state
    pub target_state: TargetState,
    /// Distance of the moving target
    pub moving_distance: u16,
    /// Energy of the moving target
    pub moving_energy: u8,
    /// Distance of the stationary target
    pub stationary_distance: u16,
    /// Energy of the stationary target
    pub stationary_energy: u8,
    /// Detection distance
    pub detection_distance: u16,
    /// Host time of decoding, the protocol carries no device timestamp.
    pub captured_at: DateTime<Utc>,
}

impl TelemetryReport {
    /// Decodes a report payload stamped with the current time.
    pub fn decode(payload: &[u8]) -> Option<TelemetryReport> {
        Self::decode_at(payload, Utc::now())
    }

    /// Decodes a report payload, which must be exactly nine bytes.
    pub fn decode_at(payload: &[u8], captured_at: DateTime<Utc>) -> Option<TelemetryReport> {
        let data: &[u8; REPORT_PAYLOAD_LEN] = payload.try_into().ok()?;

        Some(TelemetryReport {
            target_state: TargetState::from(data[0]),
            moving_distance: u16::from_le_bytes([data[1], data[2]]),
            moving_energy: data[3],
            stationary_distance: u16::from_le_bytes([data[4], data[5]]),
            stationary_energy: data[6],
            detection_distance: u16::from_le_bytes([data[7], data[8]]),
            captured_at,
        })
    }

    /// A moving target is present.
    pub fn moving_present(&self) -> bool {
        matches!(
            self.target_state,
            TargetState::Moving | TargetState::MovingAndStationary
        )
    }

    /// A stationary target is present.
    pub fn stationary_present(&self) -> bool {
        matches!(
            self.target_state,
            TargetState::Stationary | TargetState::MovingAndStationary
        )
    }
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} moving={}cm/{} stationary={}cm/{} detection={}cm",
            self.target_state,
            self.moving_distance,
            self.moving_energy,
            self.stationary_distance,
            self.stationary_energy,
            self.detection_distance
        )
    }
}

/// Externally observable radar state: the latest report, if any.
///
/// Always replaced as a whole so readers never see fields of two reports.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Latest report, `None` until the first one is decoded
    pub report: Option<TelemetryReport>,
}

impl SensorSnapshot {
    /// False before the first report.
    pub fn moving_present(&self) -> bool {
        self.report.is_some_and(|report| report.moving_present())
    }

    /// False before the first report.
    pub fn stationary_present(&self) -> bool {
        self.report.is_some_and(|report| report.stationary_present())
    }

    /// Structured telemetry message for publishing.
    pub fn to_json(&self) -> Value {
        match &self.report {
            Some(report) => json!({
                "state": report.target_state.to_string(),
                "detection_distance": report.detection_distance,
                "moving": {
                    "state": report.moving_present(),
                    "distance": report.moving_distance,
                    "energy": report.moving_energy,
                },
                "stationary": {
                    "state": report.stationary_present(),
                    "distance": report.stationary_distance,
                    "energy": report.stationary_energy,
                },
                "last_update": report.captured_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                "last_update_unix": report.captured_at.timestamp_micros() as f64 / 1e6,
            }),
            None => json!({
                "state": "undefined",
                "detection_distance": 0,
                "moving": { "state": false, "distance": 0, "energy": 0 },
                "stationary": { "state": false, "distance": 0, "energy": 0 },
                "last_update": null,
                "last_update_unix": null,
            }),
        }
    }
}

impl From<TelemetryReport> for SensorSnapshot {
    fn from(report: TelemetryReport) -> Self {
        SensorSnapshot {
            report: Some(report),
        }
    }
}
