// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::Error;
use async_trait::async_trait;

/// Destination for decoded telemetry.
///
/// Delivery is at most once: implementations do not buffer or retry, and a
/// failed publish is reported to the caller, which logs it and moves on.
#[async_trait]
pub trait TelemetrySink: Send {
    /// Delivers `payload` on `topic` once.
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Error>;
}

/// Joins the namespace prefix and a per-source suffix into a topic.
pub fn topic(prefix: &str, source: &str) -> String {
    match prefix.trim_end_matches('/') {
        "" => source.to_string(),
        prefix => format!("{}/{}", prefix, source),
    }
}

#[cfg(feature = "zenoh")]
pub use self::zenoh_sink::ZenohSink;

#[cfg(feature = "zenoh")]
mod zenoh_sink {
    use super::TelemetrySink;
    use crate::error::Error;
    use async_trait::async_trait;
    use log::debug;
    use std::collections::HashMap;
    use zenoh::{
        bytes::Encoding,
        pubsub::Publisher,
        qos::{CongestionControl, Priority},
        Session,
    };

    /// Publishes JSON telemetry on Zenoh, declaring one publisher per topic
    /// on first use.
    pub struct ZenohSink {
        session: Session,
        publishers: HashMap<String, Publisher<'static>>,
    }

    impl ZenohSink {
        /// Sink publishing through `session`.
        pub fn new(session: Session) -> Self {
            ZenohSink {
                session,
                publishers: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl TelemetrySink for ZenohSink {
        async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Error> {
            if !self.publishers.contains_key(topic) {
                debug!("declaring publisher {}", topic);
                let publisher = self
                    .session
                    .declare_publisher(topic.to_string())
                    .priority(Priority::DataHigh)
                    .congestion_control(CongestionControl::Drop)
                    .await
                    .map_err(|e| Error::Publish(format!("{}: {}", topic, e)))?;
                self.publishers.insert(topic.to_string(), publisher);
            }

            let publisher = &self.publishers[topic];
            publisher
                .put(payload.to_string())
                .encoding(Encoding::APPLICATION_JSON)
                .await
                .map_err(|e| Error::Publish(format!("{}: {}", topic, e)))
        }
    }
}
