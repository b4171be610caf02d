//! Incremental UTF-8 decoding of network reads
//!
//! Network reads split text at arbitrary byte offsets. A multi-byte character
//! cut in half is held back until the rest arrives, so every decoded chunk is
//! valid text. Malformed sequences decode to U+FFFD.

#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + bytes` as forms complete characters
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut text = String::with_capacity(self.pending.len());
        let mut consumed = 0;

        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_up_to = consumed + e.valid_up_to();
                    // Prefix is valid, so this borrows without replacement
                    text.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_up_to]));
                    match e.error_len() {
                        Some(invalid_len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_up_to + invalid_len;
                        }
                        None => {
                            // Truncated character at the end: wait for more bytes
                            consumed = valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        text
    }

    /// Flush whatever is left once the stream has ended
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
