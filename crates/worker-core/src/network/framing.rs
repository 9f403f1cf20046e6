// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// A frame sequence: the wire unit throughout this crate. The first frame
/// is always the message tag; subsequent frames are tag-specific payloads.
/// This codec turns `Vec<Bytes>` frame sequences into a single
/// length-prefixed block on the stream and back, so every socket kind reads
/// and writes whole multipart messages instead of raw bytes.
#[derive(Default)]
pub struct MultipartCodec {
    next_outer_len: Option<u32>,
}

const MAX_MESSAGE_BYTES: u32 = 64 * 1024 * 1024;

impl Encoder<Vec<Bytes>> for MultipartCodec {
    type Error = std::io::Error;

    fn encode(&mut self, frames: Vec<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let inner_len: usize = frames.iter().map(|f| 4 + f.len()).sum();
        if inner_len > MAX_MESSAGE_BYTES as usize {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "multipart message too large",
            ));
        }
        dst.reserve(4 + inner_len);
        dst.put_u32(inner_len as u32);
        for frame in frames {
            dst.put_u32(frame.len() as u32);
            dst.put_slice(&frame);
        }
        Ok(())
    }
}

impl Decoder for MultipartCodec {
    type Item = Vec<Bytes>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let outer_len = match self.next_outer_len {
            Some(len) => len,
            None => {
                if src.len() < 4 {
                    return Ok(None);
                }
                let len = u32::from_be_bytes(src[..4].try_into().unwrap());
                if len > MAX_MESSAGE_BYTES {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "multipart message exceeds size limit",
                    ));
                }
                src.advance(4);
                self.next_outer_len = Some(len);
                len
            }
        };

        if (src.len() as u64) < outer_len as u64 {
            src.reserve(outer_len as usize - src.len());
            return Ok(None);
        }

        let mut payload = src.split_to(outer_len as usize);
        self.next_outer_len = None;

        let mut frames = Vec::new();
        while !payload.is_empty() {
            if payload.len() < 4 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "truncated frame length",
                ));
            }
            let frame_len = u32::from_be_bytes(payload[..4].try_into().unwrap()) as usize;
            payload.advance(4);
            if payload.len() < frame_len {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "truncated frame body",
                ));
            }
            frames.push(payload.split_to(frame_len).freeze());
        }
        Ok(Some(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_multipart_message() {
        let mut codec = MultipartCodec::default();
        let frames = vec![Bytes::from_static(b"TASK"), Bytes::from_static(b"payload")];
        let mut buf = BytesMut::new();
        codec.encode(frames.clone(), &mut buf).unwrap();

        let mut decode_codec = MultipartCodec::default();
        let decoded = decode_codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frames);
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_more_bytes_on_partial_message() {
        let mut codec = MultipartCodec::default();
        let frames = vec![Bytes::from_static(b"GROUP"), Bytes::from_static(b"xyz")];
        let mut full = BytesMut::new();
        codec.encode(frames.clone(), &mut full).unwrap();

        let mut partial = full.split_to(full.len() - 2);
        let mut decode_codec = MultipartCodec::default();
        assert!(decode_codec.decode(&mut partial).unwrap().is_none());

        partial.unsplit(full);
        let decoded = decode_codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(decoded, frames);
    }

    #[test]
    fn empty_frame_list_round_trips() {
        let mut codec = MultipartCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(vec![], &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert!(decoded.is_empty());
    }
}
