use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Decode error ({stage}): {reason}")]
    Decode { stage: DecodeStage, reason: String },

    #[error("Validation error: {reason}")]
    Validation { reason: String },

    #[error("Unsupported export version: found {found}, supported up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CalcError {
    pub fn decode(stage: DecodeStage, reason: impl ToString) -> Self {
        Self::Decode { stage, reason: reason.to_string() }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }
}

/// Which layer of the export blob failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Base64,
    Inflate,
    Json,
}

impl std::fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Base64  => "base64",
            Self::Inflate => "inflate",
            Self::Json    => "json",
        })
    }
}

pub type CalcResult<T> = Result<T, CalcError>;
