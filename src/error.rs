use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `parley`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ParleyError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Transport ───────────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Stream decoding ─────────────────────────────────────────────────
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),

    // ── Interactive questions ───────────────────────────────────────────
    #[error("ask: {0}")]
    Ask(#[from] AskError),

    // ── Startup ─────────────────────────────────────────────────────────
    #[error("bootstrap: {0}")]
    Bootstrap(#[from] BootstrapError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Transport errors ───────────────────────────────────────────────────────

/// Failures talking to the session backend. Non-2xx responses keep the
/// status and response body so the REPL can surface them verbatim.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {url} returned {status}: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),
}

// ─── Stream decode errors ───────────────────────────────────────────────────

/// Fatal to the streaming call that produced the record; the decoder's
/// carry-over buffer stays valid.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── Interactive question errors ────────────────────────────────────────────

/// Local, recoverable validation failures in the ask flow. The open
/// presentation stays open; the user may retry.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("\"{title}\" has no answer yet")]
    Unanswered { title: String },
}

// ─── Startup errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no users found; seed users were not created")]
    NoUsers,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_http_displays_status_and_body() {
        let err = ParleyError::Transport(TransportError::Http {
            method: "GET",
            url: "http://localhost/api/users".into(),
            status: 503,
            body: "down for maintenance".into(),
        });
        let rendered = err.to_string();
        assert!(rendered.contains("503"));
        assert!(rendered.contains("down for maintenance"));
    }

    #[test]
    fn decode_error_wraps_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = ParleyError::Decode(DecodeError::Json(json_err));
        assert!(err.to_string().contains("malformed record JSON"));
    }

    #[test]
    fn ask_unanswered_names_the_question() {
        let err = AskError::Unanswered {
            title: "Question 2".into(),
        };
        assert!(err.to_string().contains("Question 2"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let parley_err: ParleyError = anyhow_err.into();
        assert!(parley_err.to_string().contains("something went wrong"));
    }
}
