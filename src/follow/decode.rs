//! Incremental UTF-8 decoding of raw file chunks.

/// Decodes byte chunks into text, carrying an incomplete multi-byte sequence
/// over to the next chunk. Invalid bytes are dropped.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.carry);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(std::str::from_utf8(&rest[..valid]).unwrap_or_default());
                    match err.error_len() {
                        Some(invalid) => rest = &rest[valid + invalid..],
                        None => {
                            // Truncated sequence at the end: wait for more bytes.
                            self.carry = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Forget a carried partial sequence (the file it came from is gone).
    pub fn reset(&mut self) {
        self.carry.clear();
    }

    pub fn has_pending(&self) -> bool {
        !self.carry.is_empty()
    }
}
