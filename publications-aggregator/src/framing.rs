//! Decoder for responses that wrap a JSON document in fixed-length text.
//!
//! The Sheets query endpoint answers `tqx=out:json` requests with
//!
//! ```text
//! /*O_o*/
//! google.visualization.Query.setResponse({...});
//! ```
//!
//! i.e. a 47-byte prefix, the JSON body, and the 2-byte suffix `);`. The
//! frame is treated as a format of its own so that truncated or foreign
//! bodies fail loudly instead of being sliced into garbage.

/// Byte lengths of the text surrounding the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub prefix_len: usize,
    pub suffix_len: usize,
}

pub const GVIZ_PREFIX: &str = "/*O_o*/\ngoogle.visualization.Query.setResponse(";
pub const GVIZ_SUFFIX: &str = ");";

pub const GVIZ_FRAME: FrameFormat = FrameFormat {
    prefix_len: GVIZ_PREFIX.len(),
    suffix_len: GVIZ_SUFFIX.len(),
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame truncated: {len} bytes, need at least {required}")]
    Truncated { len: usize, required: usize },

    #[error("frame boundary at byte {offset} splits a character")]
    Malformed { offset: usize },
}

impl FrameFormat {
    pub fn required_len(&self) -> usize {
        self.prefix_len + self.suffix_len
    }

    /// Strips the frame and returns the payload. Whitespace around the whole
    /// body (trailing newlines) is not part of the frame.
    pub fn decode<'a>(&self, body: &'a str) -> Result<&'a str, FrameError> {
        let body = body.trim();
        let required = self.required_len();
        if body.len() < required {
            return Err(FrameError::Truncated {
                len: body.len(),
                required,
            });
        }

        let end = body.len() - self.suffix_len;
        body.get(self.prefix_len..end).ok_or_else(|| {
            let offset = if body.is_char_boundary(self.prefix_len) {
                end
            } else {
                self.prefix_len
            };
            FrameError::Malformed { offset }
        })
    }
}

/// Wraps `payload` the way the Sheets endpoint does.
pub fn wrap_gviz(payload: &str) -> String {
    format!("{}{}{}", GVIZ_PREFIX, payload, GVIZ_SUFFIX)
}
