use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of ASR backends the service knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineName {
    Whisper,
    #[serde(rename = "gigaam")]
    GigaAm,
}

impl EngineName {
    pub const ALL: [EngineName; 2] = [EngineName::Whisper, EngineName::GigaAm];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineName::Whisper => "whisper",
            EngineName::GigaAm => "gigaam",
        }
    }
}

impl FromStr for EngineName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whisper" => Ok(EngineName::Whisper),
            "gigaam" => Ok(EngineName::GigaAm),
            other => Err(format!("Invalid engine name: {}", other)),
        }
    }
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
