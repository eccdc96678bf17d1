//! Server-sent-event decoding for streamed chat completions.
//!
//! The provider sends `data: {json}` lines separated by blank lines and ends the
//! stream with `data: [DONE]`. Chunk boundaries are arbitrary, so bytes are
//! buffered until a full line is available.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use super::{LlmError, TextStream};

const DONE_MARKER: &str = "[DONE]";

/// Line-buffering SSE parser that yields the payload of each `data:` field.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes and returns the data payloads of every completed line.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Returns the payload of a trailing line that never got its newline.
    pub fn flush(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        data_payload(&line).into_iter().collect()
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    line.strip_prefix("data:")
        .map(|payload| payload.trim_start().to_string())
}

#[derive(Debug, Deserialize)]
struct ChunkBody {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, PartialEq)]
enum StreamEvent {
    Delta(String),
    Done,
    Skip,
}

fn parse_payload(payload: &str) -> Result<StreamEvent, LlmError> {
    if payload == DONE_MARKER {
        return Ok(StreamEvent::Done);
    }

    let body: ChunkBody =
        serde_json::from_str(payload).map_err(|e| LlmError::Decode(e.to_string()))?;

    Ok(body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|text| !text.is_empty())
        .map(StreamEvent::Delta)
        .unwrap_or(StreamEvent::Skip))
}

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    parser: SseParser,
    pending: VecDeque<String>,
    done: bool,
}

impl<S> DecodeState<S> {
    fn absorb(&mut self, payloads: Vec<String>) -> Result<(), LlmError> {
        for payload in payloads {
            if self.done {
                break;
            }
            match parse_payload(&payload)? {
                StreamEvent::Delta(text) => self.pending.push_back(text),
                StreamEvent::Done => self.done = true,
                StreamEvent::Skip => {}
            }
        }
        Ok(())
    }
}

async fn next_delta<S, E>(
    mut state: DecodeState<S>,
) -> Result<Option<(String, DecodeState<S>)>, LlmError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<LlmError>,
{
    loop {
        if let Some(delta) = state.pending.pop_front() {
            return Ok(Some((delta, state)));
        }
        if state.done {
            return Ok(None);
        }

        match state.bytes.next().await {
            Some(Ok(chunk)) => {
                let payloads = state.parser.feed(&chunk);
                state.absorb(payloads)?;
            }
            Some(Err(e)) => return Err(e.into()),
            None => {
                let payloads = state.parser.flush();
                state.absorb(payloads)?;
                state.done = true;
            }
        }
    }
}

/// Turns a raw byte stream from the provider into a stream of text deltas.
pub fn decode_stream<S, E>(bytes: S) -> TextStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        parser: SseParser::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::try_unfold(state, next_delta).boxed()
}
