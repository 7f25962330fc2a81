use std::fmt;
use std::str::FromStr;

use crate::error::DownloadError;

/// A validated resolution label such as "1080p"
///
/// The label is normalized at the boundary: it must be a positive height
/// followed by a single 'p'. This keeps the numeric bound derivation from
/// silently truncating whatever character happens to be last in the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    height: u32,
}

impl Resolution {
    /// Labels offered to users, highest first
    pub const SUPPORTED: &'static [&'static str] = &["2160p", "1440p", "1080p", "720p", "480p"];

    pub fn parse(label: &str) -> Result<Self, DownloadError> {
        let invalid = || DownloadError::InvalidResolution(label.to_string());

        let digits = label.strip_suffix('p').ok_or_else(invalid)?;
        let height: u32 = digits.parse().map_err(|_| invalid())?;
        if height == 0 {
            return Err(invalid());
        }
        Ok(Self { height })
    }

    /// Height bound used in the engine's format selector
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn label(&self) -> String {
        format!("{}p", self.height)
    }

    /// yt-dlp format selector: best video at or below this height, combined
    /// with best audio, falling back to the single best stream
    pub fn format_selector(&self) -> String {
        format!("bestvideo[height<={}]+bestaudio/best", self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self { height: 1080 }
    }
}

impl FromStr for Resolution {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height)
    }
}
