/// Accumulates raw body chunks and splits out complete lines.
///
/// The backend streams one JSON object per line, but chunk boundaries land
/// anywhere, including in the middle of a multi-byte character. Bytes are
/// buffered until a newline arrives; a trailing partial line stays in the
/// buffer for the next chunk.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line completed by it, oldest first.
    /// Blank lines are dropped; a `\r` before the newline is stripped.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = String::from_utf8_lossy(&raw);
            if !line.trim().is_empty() {
                lines.push(line.into_owned());
            }
        }
        lines
    }

    /// Drain whatever is left after the body ends without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buffer).trim().to_string();
        self.buffer.clear();
        (!line.is_empty()).then_some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines_in_one_chunk() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push_chunk(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push_chunk(b"{\"response\":\"He").is_empty());
        let lines = decoder.push_chunk(b"llo\",\"done\":false}\n");
        assert_eq!(lines, vec!["{\"response\":\"Hello\",\"done\":false}"]);
    }

    #[test]
    fn test_partial_line_not_double_processed() {
        let mut decoder = LineDecoder::new();
        let first = decoder.push_chunk(b"{\"a\":1}\n{\"b\":");
        assert_eq!(first, vec!["{\"a\":1}"]);
        let second = decoder.push_chunk(b"2}\n");
        assert_eq!(second, vec!["{\"b\":2}"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut decoder = LineDecoder::new();
        let bytes = "{\"response\":\"héllo\"}\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = bytes.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(decoder.push_chunk(&bytes[..split]).is_empty());
        let lines = decoder.push_chunk(&bytes[split..]);
        assert_eq!(lines, vec!["{\"response\":\"héllo\"}"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push_chunk(b"\n  \n{\"a\":1}\n\n");
        assert_eq!(lines, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_crlf_stripped() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push_chunk(b"{\"a\":1}\r\n");
        assert_eq!(lines, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_finish_returns_trailing_line() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push_chunk(b"{\"done\":true}").is_empty());
        assert_eq!(decoder.finish(), Some("{\"done\":true}".to_string()));
        assert_eq!(decoder.finish(), None);
    }
}
