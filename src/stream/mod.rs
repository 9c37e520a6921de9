//! Incremental decoder for the backend's `text/event-stream` channel.

use crate::api::Envelope;
use crate::error::DecodeError;
use std::borrow::Cow;

/// Turns raw response chunks into discrete [`Envelope`]s regardless of how
/// the network slices the stream.
///
/// Chunks accumulate in a raw byte buffer that is split on the `\n\n`
/// record separator; the trailing (possibly incomplete) segment stays
/// buffered for the next call, which handles separators split across chunk
/// boundaries. Buffering bytes rather than text matters: a chunk boundary
/// can land inside a multibyte UTF-8 codepoint, and decoding happens only
/// once a record is complete. Within a record only `data: ` lines matter.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one chunk and collect every envelope completed by it.
    ///
    /// Empty chunks are legal no-ops. Malformed JSON in a `data:` line is a
    /// hard failure for that record; the record has already been consumed,
    /// so the buffer stays valid for subsequent feeds.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Envelope>, DecodeError> {
        self.buffer.extend_from_slice(chunk);

        let mut envelopes = Vec::new();
        while let Some(record) = self.next_record() {
            let record = String::from_utf8_lossy(&record);
            for data in record.lines().filter_map(|line| line.strip_prefix("data: ")) {
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }
                envelopes.push(serde_json::from_str(data)?);
            }
        }
        Ok(envelopes)
    }

    /// Text left buffered when the stream ends. Intentionally dropped by
    /// callers: there is no partial-record delivery.
    pub fn residual(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    fn next_record(&mut self) -> Option<Vec<u8>> {
        let boundary = self.buffer.windows(2).position(|pair| pair == b"\n\n")?;
        let remaining = self.buffer.split_off(boundary + 2);
        Some(std::mem::replace(&mut self.buffer, remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::FrameDecoder;
    use crate::api::Envelope;

    fn message_record(id: &str) -> String {
        format!(
            "data: {{\"event\":\"message\",\"payload\":{{\"id\":\"{id}\",\"role\":\"assistant\",\"message_type\":\"AssistantMessage\",\"payload\":{{}}}}}}\n\n"
        )
    }

    fn feed_all(decoder: &mut FrameDecoder, input: &[u8]) -> Vec<Envelope> {
        decoder.feed(input).unwrap()
    }

    #[test]
    fn whole_stream_and_split_stream_agree_at_every_offset() {
        let input = format!("{}{}", message_record("m1"), message_record("m2"));
        let bytes = input.as_bytes();

        let mut whole = FrameDecoder::new();
        let expected = feed_all(&mut whole, bytes);
        assert_eq!(expected.len(), 2);

        for offset in 0..=bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut envelopes = feed_all(&mut decoder, &bytes[..offset]);
            envelopes.extend(feed_all(&mut decoder, &bytes[offset..]));
            assert_eq!(envelopes.len(), expected.len(), "split at {offset}");
        }
    }

    #[test]
    fn multibyte_codepoint_split_across_chunks_survives() {
        let input = "data: {\"event\":\"message\",\"payload\":{\"id\":\"m1\",\"role\":\"assistant\",\"message_type\":\"AssistantMessage\",\"payload\":{\"content\":\"café 日本語\"}}}\n\n";
        let bytes = input.as_bytes();

        fn content_of(envelope: &Envelope) -> String {
            match envelope {
                Envelope::Message(message) => message
                    .payload
                    .get("content")
                    .and_then(|value| value.as_str())
                    .unwrap()
                    .to_string(),
                Envelope::Error(_) => panic!("expected message envelope"),
            }
        }

        let mut whole = FrameDecoder::new();
        let expected = content_of(&whole.feed(bytes).unwrap()[0]);
        assert_eq!(expected, "café 日本語");

        for offset in 0..=bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut envelopes = decoder.feed(&bytes[..offset]).unwrap();
            envelopes.extend(decoder.feed(&bytes[offset..]).unwrap());
            assert_eq!(envelopes.len(), 1, "split at {offset}");
            assert_eq!(content_of(&envelopes[0]), expected, "split at {offset}");
        }
    }

    #[test]
    fn single_record_split_mid_separator_yields_one_envelope() {
        let input = "data: {\"event\":\"message\",\"payload\":{\"role\":\"assistant\",\"message_type\":\"AssistantMessage\",\"payload\":{}}}\n\n";
        let bytes = input.as_bytes();

        for offset in 0..=bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut total = decoder.feed(&bytes[..offset]).unwrap().len();
            total += decoder.feed(&bytes[offset..]).unwrap().len();
            assert_eq!(total, 1, "split at {offset}");
        }
    }

    #[test]
    fn record_without_data_line_yields_nothing() {
        let mut decoder = FrameDecoder::new();
        let envelopes = decoder.feed(b"event: ping\nretry: 500\n\n").unwrap();
        assert!(envelopes.is_empty());
    }

    #[test]
    fn empty_chunk_is_a_noop() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"").unwrap().is_empty());
        assert!(decoder.residual().is_empty());
    }

    #[test]
    fn malformed_json_fails_without_corrupting_buffer() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {not json}\n\n").is_err());

        // The bad record was consumed; later records still decode.
        let envelopes = decoder.feed(message_record("m3").as_bytes()).unwrap();
        assert_eq!(envelopes.len(), 1);
    }

    #[test]
    fn trailing_partial_record_stays_buffered() {
        let mut decoder = FrameDecoder::new();
        let envelopes = decoder
            .feed(b"data: {\"event\":\"error\",\"payload\":{\"message\":\"x\"}}\n\ndata: {\"ev")
            .unwrap();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(decoder.residual(), "data: {\"ev");
    }

    #[test]
    fn error_envelope_decodes() {
        let mut decoder = FrameDecoder::new();
        let envelopes = decoder
            .feed(b"data: {\"event\":\"error\",\"payload\":{\"message\":\"boom\",\"created_at\":\"t\"}}\n\n")
            .unwrap();
        match &envelopes[0] {
            Envelope::Error(failure) => assert_eq!(failure.message, "boom"),
            Envelope::Message(_) => panic!("expected error envelope"),
        }
    }

    #[test]
    fn multiple_data_lines_in_one_record_all_decode() {
        let mut decoder = FrameDecoder::new();
        let record = format!(
            "{}{}",
            message_record("a").trim_end_matches('\n'),
            "\ndata: {\"event\":\"error\",\"payload\":{\"message\":\"late\"}}\n\n"
        );
        let envelopes = decoder.feed(record.as_bytes()).unwrap();
        assert_eq!(envelopes.len(), 2);
    }
}
