// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{fmt, io};

/// Presence radar error types.
///
/// Framing and acknowledgement problems are not errors; the codec reports
/// them as `None` and the protocol layer as `Ok(false)`. What remains here
/// are failures the caller must act on.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the underlying serial channel
    Io(io::Error),
    /// Serial port could not be opened or configured
    Serial(String),
    /// Argument rejected before any I/O was issued
    InvalidArgument(String),
    /// Telemetry sink failed to deliver a message
    Publish(String),
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(feature = "serial")]
impl From<tokio_serial::Error> for Error {
    fn from(err: tokio_serial::Error) -> Error {
        Error::Serial(err.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Serial(err) => write!(f, "serial error: {}", err),
            Error::InvalidArgument(err) => write!(f, "invalid argument: {}", err),
            Error::Publish(err) => write!(f, "publish error: {}", err),
        }
    }
}
