// src/protocol/binary.rs
use crate::error::{Error, Result};
use crate::protocol::constants::HEADER_SIZE;
use crate::protocol::message::Frame;

pub struct BinaryProtocol;

impl BinaryProtocol {
    /// Encode a frame to its wire form: `type | origin | destination | seq | len | payload`.
    pub fn encode(frame: &Frame) -> Result<Vec<u8>> {
        if frame.payload.len() > u8::MAX as usize {
            return Err(Error::Codec(format!(
                "payload of {} bytes exceeds the 255-byte limit",
                frame.payload.len()
            )));
        }

        let mut buffer = Vec::with_capacity(HEADER_SIZE + frame.payload.len());
        buffer.push(frame.msg_type);
        buffer.push(frame.origin_id);
        buffer.push(frame.destination_id);
        buffer.push(frame.seq_num);
        buffer.push(frame.payload.len() as u8);
        buffer.extend_from_slice(&frame.payload);
        Ok(buffer)
    }

    /// Decode a frame from its wire form, rejecting short frames and any
    /// declared `payload_len` that disagrees with the remaining bytes.
    pub fn decode(data: &[u8]) -> Result<Frame> {
        if data.len() < HEADER_SIZE {
            return Err(Error::Codec(format!(
                "frame of {} bytes shorter than the {}-byte header",
                data.len(),
                HEADER_SIZE
            )));
        }

        let msg_type = data[0];
        let origin_id = data[1];
        let destination_id = data[2];
        let seq_num = data[3];
        let payload_len = data[4] as usize;
        let remaining = data.len() - HEADER_SIZE;

        if remaining != payload_len {
            return Err(Error::Codec(format!(
                "payload_len {payload_len} disagrees with {remaining} remaining bytes"
            )));
        }

        Ok(Frame {
            msg_type,
            origin_id,
            destination_id,
            seq_num,
            payload: data[HEADER_SIZE..].to_vec(),
        })
    }
}
