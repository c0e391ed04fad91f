use anyhow::{Context, Result};
use serde_json::Value;

use crate::events::OutboundEvent;

/// Encode one event as an SSE frame: `event:` line, `data:` line, blank
/// line. Each frame is self-contained; the payload is never split.
pub fn encode_frame(event: &OutboundEvent) -> String {
    format!("event: {}\ndata: {}\n\n", event.event_type(), event.data())
}

/// A decoded SSE frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: String,
    pub data: Value,
}

/// Client-side frame reassembly.
///
/// Frames may arrive split across arbitrary read boundaries, including mid
/// UTF-8 character; `push` buffers raw bytes and decodes text only for
/// frames whose terminating blank line has arrived.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseFrame>> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(boundary) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let raw: Vec<u8> = self.buffer.drain(..boundary + 2).collect();
            let text = std::str::from_utf8(&raw).context("SSE frame is not valid UTF-8")?;
            if let Some(frame) = parse_frame(text.trim_end())? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }
}

fn parse_frame(raw: &str) -> Result<Option<SseFrame>> {
    let mut event = None;
    let mut data = None;

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("event: ") {
            event = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("data: ") {
            data = Some(rest.to_string());
        }
    }

    match (event, data) {
        (Some(event), Some(data)) => {
            let data: Value =
                serde_json::from_str(&data).context("SSE data payload is not valid JSON")?;
            Ok(Some(SseFrame { event, data }))
        }
        // Comment frames and keep-alives carry no event; skip them.
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ToolOutcome;
    use serde_json::json;

    #[test]
    fn encodes_byte_exact_frame() {
        let event = OutboundEvent::ContentDelta {
            text: "Section 420".to_string(),
        };
        assert_eq!(
            encode_frame(&event),
            "event: content_delta\ndata: {\"text\":\"Section 420\"}\n\n"
        );
    }

    #[test]
    fn decoder_reassembles_frame_split_across_reads() {
        let encoded = encode_frame(&OutboundEvent::ToolUseEnd {
            tool_name: "search_legal_documents".to_string(),
            outcome: ToolOutcome::Result(json!({"results_count": 1})),
        });
        let bytes = encoded.as_bytes();

        let mut decoder = SseFrameDecoder::new();
        // Feed one byte at a time; nothing may surface before the blank line.
        let mut frames = Vec::new();
        for chunk in bytes.chunks(1) {
            frames.extend(decoder.push(chunk).unwrap());
        }

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "tool_use_end");
        assert_eq!(frames[0].data["result"]["results_count"], json!(1));
    }

    #[test]
    fn decoder_reassembles_reads_that_split_a_multibyte_character() {
        // Hindi statute text: every character is multi-byte, so single-byte
        // reads land mid-character.
        let encoded = encode_frame(&OutboundEvent::ContentDelta {
            text: "धारा 420 के तहत छल".to_string(),
        });

        let mut decoder = SseFrameDecoder::new();
        let mut frames = Vec::new();
        for chunk in encoded.as_bytes().chunks(1) {
            frames.extend(decoder.push(chunk).unwrap());
        }

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "content_delta");
        assert_eq!(frames[0].data["text"], json!("धारा 420 के तहत छल"));
    }

    #[test]
    fn decoder_splits_multiple_frames_in_one_read() {
        let mut encoded = encode_frame(&OutboundEvent::assistant_start());
        encoded.push_str(&encode_frame(&OutboundEvent::MessageEnd {
            content: "done".to_string(),
        }));

        let mut decoder = SseFrameDecoder::new();
        let frames = decoder.push(encoded.as_bytes()).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, "message_start");
        assert_eq!(frames[1].event, "message_end");
        assert_eq!(frames[1].data["content"], json!("done"));
    }

    #[test]
    fn decoder_holds_incomplete_frame() {
        let mut decoder = SseFrameDecoder::new();
        let frames = decoder.push(b"event: message_start\ndata: {\"role\"").unwrap();
        assert!(frames.is_empty());

        let frames = decoder.push(b": \"assistant\"}\n\n").unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data["role"], json!("assistant"));
    }
}
