// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! PresencePub Library
//!
//! This library provides the serial protocol engine for HLK-LD2410 family
//! presence radar modules and the acquisition loop publishing their
//! telemetry to the EdgeFirst Perception Middleware via Zenoh.
//!
//! # Features
//!
//! - **Frame Codec** - Config command frames, acknowledgements and reports
//! - **Config Protocol** - Acknowledged configuration commands and sessions
//! - **Report Decoding** - Target state, distances and energies
//! - **Acquisition** - Setup, measure and publish state machine
//! - **Zenoh Publishing** - JSON telemetry on `<prefix>/radar`

#![warn(missing_docs)]

/// Acquisition state machine driving setup and continuous publishing
pub mod acquisition;

/// Crate error type
pub mod error;

/// Config and report frame encoding and decoding
pub mod frame;

/// LD2410 configuration protocol
pub mod ld2410;

/// Report payload decoding and telemetry snapshots
pub mod report;

/// Serial channel abstraction and tokio-serial implementation
pub mod serial;

/// Telemetry sink interface and Zenoh implementation
pub mod sink;

#[cfg(test)]
mod mock;

pub use error::Error;
