// =============================================================================
// Shared types used across the setup scanner
// =============================================================================

use serde::{Deserialize, Serialize};

/// The named setups a scan can look for.
///
/// Each variant carries a single-letter tag used in config files and on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanMode {
    /// LSMA(9) turns up after declining (tag `A`).
    #[serde(rename = "A")]
    FastReversal,
    /// LSMA(25) turns up after declining (tag `B`).
    #[serde(rename = "B")]
    SlowReversal,
    /// LSMA(9) > LSMA(25) > SMA(20) today (tag `C`).
    #[serde(rename = "C")]
    BullishStack,
    /// Bullish stacking today but not yesterday (tag `D`).
    #[serde(rename = "D")]
    FirstBullishDay,
    /// A small next-day rise would complete the stack (tag `E`).
    #[serde(rename = "E")]
    BreakoutPrediction,
    /// +DI over -DI with rising +DI / ADX / ADXR (tag `F`).
    #[serde(rename = "F")]
    DmiBullish,
    /// OBV turning up off a recent trough (tag `G`).
    #[serde(rename = "G")]
    ObvReversal,
    /// `F` plus a falling -DI (tag `H`).
    #[serde(rename = "H")]
    DmiBullishStrict,
}

impl Default for ScanMode {
    fn default() -> Self {
        Self::BullishStack
    }
}

impl ScanMode {
    pub const ALL: [ScanMode; 8] = [
        Self::FastReversal,
        Self::SlowReversal,
        Self::BullishStack,
        Self::FirstBullishDay,
        Self::BreakoutPrediction,
        Self::DmiBullish,
        Self::ObvReversal,
        Self::DmiBullishStrict,
    ];

    /// Single-letter tag.
    pub fn tag(self) -> char {
        match self {
            Self::FastReversal => 'A',
            Self::SlowReversal => 'B',
            Self::BullishStack => 'C',
            Self::FirstBullishDay => 'D',
            Self::BreakoutPrediction => 'E',
            Self::DmiBullish => 'F',
            Self::ObvReversal => 'G',
            Self::DmiBullishStrict => 'H',
        }
    }

    /// Parse a tag (case-insensitive, surrounding whitespace ignored).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let mut chars = tag.trim().chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ALL.into_iter().find(|m| m.tag() == c)
    }

    /// Human-readable label for status output.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::FastReversal => "LSMA9 reversal",
            Self::SlowReversal => "LSMA25 reversal",
            Self::BullishStack => "Bullish stacking",
            Self::FirstBullishDay => "First bullish day",
            Self::BreakoutPrediction => "Breakout prediction",
            Self::DmiBullish => "DMI bullish",
            Self::ObvReversal => "OBV reversal",
            Self::DmiBullishStrict => "DMI bullish (strict)",
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.tag(), self.display_name())
    }
}

/// Ordering applied to scan hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    /// Numeric part of the ticker code ascending, then the code itself.
    Code,
    /// Day-over-day change, largest first.
    Change,
    /// Last close, highest first.
    Price,
}

impl Default for SortMode {
    fn default() -> Self {
        Self::Code
    }
}

impl SortMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Some(Self::Code),
            "change" => Some(Self::Change),
            "price" => Some(Self::Price),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code => write!(f, "Code"),
            Self::Change => write!(f, "Change"),
            Self::Price => write!(f, "Price"),
        }
    }
}
