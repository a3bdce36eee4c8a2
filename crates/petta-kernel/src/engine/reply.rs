//! Line parsing for the engine driver protocol
//!
//! The driver answers every request with zero or more result lines, an
//! optional raised-error line, and a terminating `.` line. Result texts and
//! error messages are written as JSON string literals so they can carry
//! newlines; a payload that is not a JSON string is taken verbatim.

/// One line written by the engine driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeLine {
    /// `+ <text>`: startup handshake
    Ready(String),

    /// `= <text>`: one evaluation result
    Result(String),

    /// `! <kind>: <message>`: evaluation raised
    Raised { kind: String, message: String },

    /// `.`: end of the current response
    End,

    /// Anything else the engine printed
    Noise(String),
}

impl BridgeLine {
    /// Parse a single line, without its trailing newline
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);

        if line == "." {
            return BridgeLine::End;
        }

        if let Some(text) = line.strip_prefix("= ") {
            return BridgeLine::Result(decode_payload(text));
        }
        if line == "=" {
            return BridgeLine::Result(String::new());
        }

        if let Some(rest) = line.strip_prefix("! ") {
            return match rest.split_once(": ") {
                Some((kind, message)) if !kind.trim().is_empty() => BridgeLine::Raised {
                    kind: kind.trim().to_owned(),
                    message: decode_payload(message),
                },
                _ => BridgeLine::Raised {
                    kind: "EngineError".to_owned(),
                    message: decode_payload(rest),
                },
            };
        }

        if let Some(text) = line.strip_prefix("+ ") {
            return BridgeLine::Ready(text.to_owned());
        }

        BridgeLine::Noise(line.to_owned())
    }
}

fn decode_payload(text: &str) -> String {
    if text.starts_with('"')
        && let Ok(decoded) = serde_json::from_str::<String>(text)
    {
        return decoded;
    }
    text.to_owned()
}
