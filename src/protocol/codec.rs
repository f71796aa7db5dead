use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::{Address, Error, Result, SessionId, MAX_FRAME_SIZE};
use super::message::{Frame, FrameKind};

/// Encodes a frame into its single-line wire form (no trailing newline)
pub fn encode(frame: &Frame) -> String {
    frame.to_string()
}

/// Encodes a frame from loose fields, failing when the kind requires a missing field
pub fn encode_fields(
    kind: FrameKind,
    id: Option<SessionId>,
    origin: Option<Address>,
    payload: Option<&str>,
) -> Result<String> {
    Frame::from_parts(kind, id, origin, payload).map(|frame| encode(&frame))
}

/// Decodes one wire line into a frame.
///
/// Trailing line terminators are ignored. Any missing or unparsable field
/// yields `Error::MalformedFrame`.
pub fn decode(line: &str) -> Result<Frame> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut chars = line.chars();
    let flag = chars.next().ok_or_else(|| Error::malformed("empty frame"))?;
    let kind = FrameKind::from_flag(flag)
        .ok_or_else(|| Error::malformed(format!("unrecognized flag {:?}", flag)))?;
    let rest = chars.as_str();

    if kind == FrameKind::Connected {
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Err(Error::malformed(format!("unrecognized frame {:?}", line)));
        }
        return Ok(Frame::Connected);
    }

    let fields = rest
        .strip_prefix(' ')
        .ok_or_else(|| Error::malformed(format!("{:?} frame is truncated: {:?}", kind, line)))?;
    let (id, rest) = split_field(fields);
    if id.is_empty() {
        return Err(Error::malformed(format!("{:?} frame has an empty id", kind)));
    }
    let id: SessionId = id.parse()?;

    let (origin, payload) = match kind {
        FrameKind::Broadcast | FrameKind::Direct => match rest.map(split_field) {
            Some((origin, payload)) => {
                let origin: Address = origin
                    .parse()
                    .map_err(|e| Error::malformed(format!("bad origin in {:?} frame: {}", kind, e)))?;
                (Some(origin), payload)
            }
            None => (None, None),
        },
        _ => (None, rest),
    };

    Frame::from_parts(kind, Some(id), origin, payload)
}

/// Splits off the first space-separated field
fn split_field(s: &str) -> (&str, Option<&str>) {
    match s.split_once(' ') {
        Some((field, rest)) => (field, Some(rest)),
        None => (s, None),
    }
}

/// Newline-delimited frame codec for byte streams and datagrams
#[derive(Clone, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Creates a new frame codec
    pub fn new() -> Self {
        FrameCodec
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            let Some(newline) = src.iter().position(|b| *b == b'\n') else {
                if src.len() > MAX_FRAME_SIZE {
                    src.clear();
                    return Err(Error::malformed("frame exceeds maximum size"));
                }
                // Need more data to read a full line
                return Ok(None);
            };

            let line = src.split_to(newline + 1);
            let text = std::str::from_utf8(&line)
                .map_err(|e| Error::malformed(format!("frame is not valid UTF-8: {}", e)))?;
            if text.trim().is_empty() {
                continue;
            }
            return decode(text).map(Some);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        // Datagrams may omit the final newline
        let line = src.split();
        let text = std::str::from_utf8(&line)
            .map_err(|e| Error::malformed(format!("frame is not valid UTF-8: {}", e)))?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        decode(text).map(Some)
    }
}

impl Encoder<&Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: &Frame, dst: &mut BytesMut) -> Result<()> {
        let line = encode(item);
        if line.len() + 1 > MAX_FRAME_SIZE {
            return Err(Error::malformed(format!(
                "{:?} frame of {} bytes exceeds maximum size",
                item.kind(),
                line.len()
            )));
        }

        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');

        Ok(())
    }
}
