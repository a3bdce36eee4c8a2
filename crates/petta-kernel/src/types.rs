use serde::{Deserialize, Serialize};

/// Display text and error flag derived from one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassifiedOutput {
    /// Text to display, or None when there is nothing to show
    pub text: Option<String>,

    /// Whether the text describes an error reported by the backend
    pub is_error: bool,
}

impl ClassifiedOutput {
    /// No output and no error
    pub fn none() -> Self {
        Self::default()
    }

    /// Successful output
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            is_error: false,
        }
    }

    /// Error output
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            is_error: true,
        }
    }

    /// Convert into the stream this output should be written to, if any
    pub fn into_stream(self) -> Option<Stream> {
        let name = if self.is_error {
            StreamName::Stderr
        } else {
            StreamName::Stdout
        };
        self.text.map(|text| Stream { name, text })
    }
}

/// Name of an output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    Stdout,
    Stderr,
}

/// Text written to one of the output streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub name: StreamName,
    pub text: String,
}

impl Stream {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            name: StreamName::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            name: StreamName::Stderr,
            text: text.into(),
        }
    }
}

/// A request to execute one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Source text, handed to the engine without interpretation
    pub code: String,

    /// Suppress all stream output for this request
    #[serde(default)]
    pub silent: bool,

    /// Count this request towards the execution counter
    #[serde(default = "default_store_history")]
    pub store_history: bool,
}

impl ExecuteRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            silent: false,
            store_history: true,
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn store_history(mut self, store_history: bool) -> Self {
        self.store_history = store_history;
        self
    }
}

fn default_store_history() -> bool {
    true
}

/// Status of an execute reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecuteStatus {
    Ok,
    Error,
}

/// Reply to an execute request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteReply {
    pub status: ExecuteStatus,

    pub execution_count: u32,

    /// Error kind name (error replies only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ename: Option<String>,

    /// Error message (error replies only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evalue: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traceback: Vec<String>,

    #[serde(default)]
    pub payload: Vec<serde_json::Value>,

    #[serde(default)]
    pub user_expressions: serde_json::Map<String, serde_json::Value>,
}

impl ExecuteReply {
    /// Successful reply
    pub fn ok(execution_count: u32) -> Self {
        Self {
            status: ExecuteStatus::Ok,
            execution_count,
            ename: None,
            evalue: None,
            traceback: Vec::new(),
            payload: Vec::new(),
            user_expressions: serde_json::Map::new(),
        }
    }

    /// Error reply carrying the failure kind and message
    pub fn error(execution_count: u32, ename: impl Into<String>, evalue: impl Into<String>) -> Self {
        let evalue = evalue.into();
        Self {
            status: ExecuteStatus::Error,
            execution_count,
            ename: Some(ename.into()),
            traceback: vec![evalue.clone()],
            evalue: Some(evalue),
            payload: Vec::new(),
            user_expressions: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ExecuteStatus::Ok)
    }
}

/// Everything produced by one execute request
///
/// At most one stream is written per request, before the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub stream: Option<Stream>,
    pub reply: ExecuteReply,
}

impl Execution {
    /// Whether the request failed or displayed an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.reply.is_ok()
            || matches!(
                self.stream,
                Some(Stream {
                    name: StreamName::Stderr,
                    ..
                })
            )
    }
}

/// Language metadata reported to the notebook front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub mimetype: String,
    pub file_extension: String,
    pub codemirror_mode: String,
    pub pygments_lexer: String,
}

/// Kernel metadata reported in reply to a kernel info request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelInfo {
    pub implementation: String,
    pub implementation_version: String,
    pub language: String,
    pub language_version: String,
    pub language_info: LanguageInfo,
    pub banner: String,
}

impl Default for KernelInfo {
    fn default() -> Self {
        Self {
            implementation: "PeTTa".to_owned(),
            implementation_version: env!("CARGO_PKG_VERSION").to_owned(),
            language: "MeTTa".to_owned(),
            language_version: "0.1.0".to_owned(),
            language_info: LanguageInfo {
                name: "MeTTa".to_owned(),
                mimetype: "text/x-metta".to_owned(),
                file_extension: ".metta".to_owned(),
                codemirror_mode: "scheme".to_owned(),
                pygments_lexer: "scheme".to_owned(),
            },
            banner: "PeTTa Jupyter Kernel - MeTTa Language".to_owned(),
        }
    }
}

/// Reply to a shutdown request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownReply {
    pub status: ExecuteStatus,
    pub restart: bool,
}

impl ShutdownReply {
    pub fn ok(restart: bool) -> Self {
        Self {
            status: ExecuteStatus::Ok,
            restart,
        }
    }
}
