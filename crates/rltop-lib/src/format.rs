//! Human-readable rendering of CPU and memory figures
//!
//! CPU is given in milli-cores and memory in bytes. Decimal output is
//! produced with integer arithmetic (two places, half rounded up) so the
//! same input always renders the same string.

use crate::quantity::ResourceKind;
use serde::{Deserialize, Serialize};

/// Rendered for a request, limit or percentage that is not configured
pub const NOT_SET: &str = "-";

/// Rendered for usage that the metrics API has not reported yet
pub const UNKNOWN: &str = "<unknown>";

const KI: u64 = 1 << 10;
const MI: u64 = 1 << 20;
const GI: u64 = 1 << 30;

/// Binary memory units used for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryUnit {
    Ki,
    #[default]
    Mi,
    Gi,
}

impl MemoryUnit {
    pub fn bytes(self) -> u64 {
        match self {
            MemoryUnit::Ki => KI,
            MemoryUnit::Mi => MI,
            MemoryUnit::Gi => GI,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            MemoryUnit::Ki => "Ki",
            MemoryUnit::Mi => "Mi",
            MemoryUnit::Gi => "Gi",
        }
    }

    /// The unit [`format_memory`] picks for `bytes`.
    ///
    /// Zero and sub-Ki values have no binary unit and fall back to Mi,
    /// the same as [`extract_memory_unit`] does for their rendered form.
    pub fn for_bytes(bytes: u64) -> Self {
        match bytes {
            b if b >= GI => MemoryUnit::Gi,
            b if b >= MI => MemoryUnit::Mi,
            b if b >= KI => MemoryUnit::Ki,
            _ => MemoryUnit::Mi,
        }
    }
}

impl std::fmt::Display for MemoryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// `value / unit` with two decimals
fn two_decimals(value: u64, unit: u64) -> String {
    let unit = u128::from(unit);
    let hundredths = (u128::from(value) * 100 + unit / 2) / unit;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Format milli-cores: `100m`, `1`, `1.50`
pub fn format_cpu(millicores: u64) -> String {
    match millicores {
        0 => "0".to_string(),
        m if m < 1000 => format!("{}m", m),
        m if m % 1000 == 0 => (m / 1000).to_string(),
        m => two_decimals(m, 1000),
    }
}

/// Format bytes in the largest binary unit that is at least one: `1.00Gi`, `512B`
pub fn format_memory(bytes: u64) -> String {
    match bytes {
        0 => "0".to_string(),
        b if b < KI => format!("{}B", b),
        b => {
            let unit = MemoryUnit::for_bytes(b);
            format!("{}{}", two_decimals(b, unit.bytes()), unit)
        }
    }
}

/// Format bytes in a fixed unit so a request or limit lines up with its usage column
pub fn format_memory_in_unit(bytes: u64, unit: MemoryUnit) -> String {
    if bytes == 0 {
        return NOT_SET.to_string();
    }
    format!("{}{}", two_decimals(bytes, unit.bytes()), unit)
}

/// Format a declared request or limit; zero means "not set"
pub fn format_quantity(value: u64, kind: ResourceKind) -> String {
    if value == 0 {
        return NOT_SET.to_string();
    }
    match kind {
        ResourceKind::Cpu => format_cpu(value),
        ResourceKind::Memory => format_memory(value),
    }
}

/// Recover the unit from a rendered memory string (`"128.00Mi"` -> Mi).
///
/// Sentinels, empty strings and unrecognised suffixes default to Mi.
pub fn extract_memory_unit(memory: &str) -> MemoryUnit {
    if memory.ends_with("Gi") || memory.ends_with('G') {
        MemoryUnit::Gi
    } else if memory.ends_with("Ki") || memory.ends_with('K') {
        MemoryUnit::Ki
    } else {
        MemoryUnit::Mi
    }
}

/// Parse a rendered CPU string back to milli-cores. Malformed input yields 0.
pub fn parse_cpu_display(cpu: &str) -> u64 {
    match cpu {
        "" | NOT_SET | UNKNOWN => 0,
        s => ResourceKind::Cpu.parse_str(s).unwrap_or(0),
    }
}

/// Parse a rendered memory string back to bytes. Malformed input yields 0.
pub fn parse_memory_display(memory: &str) -> u64 {
    match memory {
        "" | NOT_SET | UNKNOWN => 0,
        s => {
            let s = s.strip_suffix('B').unwrap_or(s);
            ResourceKind::Memory.parse_str(s).unwrap_or(0)
        }
    }
}
