// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Scripted channel and recording sink for protocol and acquisition tests.

use crate::{error::Error, serial::Channel, sink::TelemetrySink};
use async_trait::async_trait;
use std::{collections::VecDeque, io, time::Duration};

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
}

/// A [`Channel`] replaying pre-loaded request/response pairs.
///
/// Each write is recorded and matched against the next expectation; its
/// response is returned by the following read. Reads with no pending
/// response drain the unsolicited queue, and return nothing (a timeout)
/// once it is empty.
#[derive(Debug, Default)]
pub struct MockChannel {
    expectations: VecDeque<Expectation>,
    pending: Option<Vec<u8>>,
    unsolicited: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    clears: usize,
    unplugged: bool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Queues bytes the device emits without being asked, e.g. reports.
    pub fn push_read(&mut self, data: &[u8]) {
        self.unsolicited.push_back(data.to_vec());
    }

    /// Every later write and read fails as if the device was unplugged.
    pub fn unplug(&mut self) {
        self.unplugged = true;
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    fn check_plugged(&self) -> Result<(), Error> {
        match self.unplugged {
            true => Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "device unplugged",
            ))),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.check_plugged()?;
        self.sent.push(data.to_vec());

        match self.expectations.pop_front() {
            Some(expectation) if expectation.request == data => {
                self.pending = Some(expectation.response);
                Ok(())
            }
            Some(expectation) => Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unexpected write: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                ),
            ))),
            // Nothing scripted, the device stays silent.
            None => Ok(()),
        }
    }

    async fn read_until(
        &mut self,
        _terminator: &[u8],
        _max: usize,
        _timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        self.check_plugged()?;

        if let Some(response) = self.pending.take() {
            return Ok(response);
        }

        Ok(self.unsolicited.pop_front().unwrap_or_default())
    }

    async fn clear(&mut self) -> Result<(), Error> {
        self.check_plugged()?;
        self.clears += 1;
        Ok(())
    }
}

/// A [`TelemetrySink`] that records every message, optionally failing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub published: Vec<(String, String)>,
    pub fail: bool,
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Publish("broker unreachable".to_string()));
        }
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}
