//! render diagnostics

/// Everything that can go wrong while reading blocks and rendering documents
///
/// Each render is isolated: an error aborts the document being rendered and nothing else.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{path}: expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: &'static str,
    },
    #[error("{path}: missing required attribute")]
    MissingAttribute { path: String },
    #[error("{path}: {message}")]
    InvalidBlock { path: String, message: String },
    #[error("{path}: unable to evaluate expression")]
    Evaluate {
        path: String,
        #[source]
        source: hcl::eval::Error,
    },
    #[error("unable to encode panel \"{title}\"")]
    Encode {
        title: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode dashboard \"{title}\"")]
    EncodeDashboard {
        title: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to decode panel (title: \"{title}\", type: \"{kind}\")")]
    Decode {
        title: String,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("nothing to render at {0}")]
    UnknownAddress(String),
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidBlock {
            path: path.into(),
            message: message.into(),
        }
    }
}
