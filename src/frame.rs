// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use log::trace;

/// Header sentinel of every configuration command and acknowledgement.
pub const CONFIG_HEADER: [u8; 4] = [0xFD, 0xFC, 0xFB, 0xFA];
/// Footer sentinel of every configuration command and acknowledgement.
pub const CONFIG_FOOTER: [u8; 4] = [0x04, 0x03, 0x02, 0x01];
/// Head marker preceding the payload of a periodic report frame.
pub const REPORT_HEAD: u8 = 0xAA;
/// Tail sequence following the payload of a periodic report frame.
pub const REPORT_TAIL: [u8; 6] = [0x55, 0x00, 0xF8, 0xF7, 0xF6, 0xF5];

/// Minimum number of bytes used to encode a command value.
const MIN_VALUE_LEN: usize = 2;

/// Configuration command sent to the radar while in config mode.
///
/// The opcode is always sent as two little-endian bytes. The optional value
/// follows using as few little-endian bytes as hold it, but never fewer
/// than two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCommand {
    /// Command word
    pub opcode: u16,
    /// Command value, omitted from the frame when `None`
    pub value: Option<u32>,
}

impl ConfigCommand {
    /// Command with an optional value.
    pub fn new(opcode: u16, value: Option<u32>) -> Self {
        ConfigCommand { opcode, value }
    }

    /// Little-endian value bytes trimmed to `max(2, ceil(bits / 8))`.
    pub fn value_bytes(&self) -> Vec<u8> {
        match self.value {
            None => vec![],
            Some(value) => {
                let bits = (u32::BITS - value.leading_zeros()) as usize;
                let len = bits.div_ceil(8).max(MIN_VALUE_LEN);
                value.to_le_bytes()[..len].to_vec()
            }
        }
    }

    /// Length of the frame payload, as carried in the length field.
    pub fn payload_len(&self) -> u16 {
        (2 + self.value_bytes().len()) as u16
    }
}

impl From<&ConfigCommand> for Vec<u8> {
    fn from(cmd: &ConfigCommand) -> Self {
        let value = cmd.value_bytes();
        let mut msg = Vec::with_capacity(CONFIG_HEADER.len() + 4 + value.len() + 4);

        msg.extend_from_slice(&CONFIG_HEADER);
        msg.extend_from_slice(&cmd.payload_len().to_le_bytes());
        msg.extend_from_slice(&cmd.opcode.to_le_bytes());
        msg.extend_from_slice(&value);
        msg.extend_from_slice(&CONFIG_FOOTER);

        trace!("ConfigCommand: {:02X?}", msg);
        msg
    }
}

/// Encodes a configuration command into a complete wire frame.
pub fn encode_config_frame(cmd: &ConfigCommand) -> Vec<u8> {
    Vec::from(cmd)
}

/// Structured view over an acknowledgement payload.
///
/// The radar answers each command with the command word with bit 8 set,
/// a 16-bit status (zero on success) and any command specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigAck<'a> {
    /// Acknowledged command word, with [`ConfigAck::ACK_BIT`] set
    pub opcode: u16,
    /// Zero on success
    pub status: u16,
    /// Command specific data following the status
    pub returned: &'a [u8],
}

impl<'a> ConfigAck<'a> {
    /// Bit set in the command word of every acknowledgement.
    pub const ACK_BIT: u16 = 0x0100;

    /// Splits an ack payload, which needs at least command word and status.
    pub fn parse(payload: &'a [u8]) -> Option<ConfigAck<'a>> {
        if payload.len() < 4 {
            return None;
        }

        Some(ConfigAck {
            opcode: u16::from_le_bytes([payload[0], payload[1]]),
            status: u16::from_le_bytes([payload[2], payload[3]]),
            returned: &payload[4..],
        })
    }

    /// True when this acknowledges `opcode` with a zero status.
    pub fn accepts(&self, opcode: u16) -> bool {
        self.opcode == opcode | Self::ACK_BIT && self.status == 0
    }
}

/// Returns the payload of the first configuration frame found in `raw`.
///
/// The payload is the range after the length field up to the first footer
/// following the first header. Missing sentinels, or a length field that
/// disagrees with the payload, yield `None`.
pub fn decode_config_ack(raw: &[u8]) -> Option<&[u8]> {
    let start = find(raw, &CONFIG_HEADER)? + CONFIG_HEADER.len();
    let end = start + find(&raw[start..], &CONFIG_FOOTER)?;
    let body = &raw[start..end];

    if body.len() < 2 {
        trace!("config frame too short: {:02X?}", body);
        return None;
    }

    let length = u16::from_le_bytes([body[0], body[1]]) as usize;
    let payload = &body[2..];
    if payload.len() != length {
        trace!(
            "config frame length {} does not match payload {:02X?}",
            length,
            payload
        );
        return None;
    }

    Some(payload)
}

/// Returns the bytes between the first report head marker in `raw` and the
/// first report tail following it.
pub fn decode_report_frame(raw: &[u8]) -> Option<&[u8]> {
    let start = raw.iter().position(|&b| b == REPORT_HEAD)? + 1;
    let end = start + find(&raw[start..], &REPORT_TAIL)?;
    Some(&raw[start..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
