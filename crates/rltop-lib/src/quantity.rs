//! Conversion of Kubernetes resource quantities to milli-cores and bytes
//!
//! Parsing is done by `kube_quantity`. Conversions round up, matching the
//! API machinery's `MilliValue()` / `Value()`.

use crate::error::{Result, RltopError};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube_quantity::ParsedQuantity;
use tracing::warn;

/// Resource kinds this tool reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Cpu,
    Memory,
}

impl ResourceKind {
    /// Key used in Kubernetes resource lists
    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
        }
    }

    /// Convert a quantity to this kind's unit: milli-cores for CPU, bytes for memory.
    ///
    /// Malformed quantities are logged and treated as zero.
    pub fn amount(self, quantity: &Quantity) -> u64 {
        let parsed = ParsedQuantity::try_from(quantity)
            .map_err(|_| RltopError::InvalidQuantity(quantity.0.clone()))
            .and_then(|q| self.convert(&q, &quantity.0));

        match parsed {
            Ok(amount) => amount,
            Err(err) => {
                warn!(kind = self.key(), error = %err, "Ignoring malformed quantity");
                0
            }
        }
    }

    /// Parse a rendered figure such as `1.50` or `128.00Mi`
    pub(crate) fn parse_str(self, s: &str) -> Result<u64> {
        let parsed = ParsedQuantity::try_from(s)
            .map_err(|_| RltopError::InvalidQuantity(s.to_string()))?;
        self.convert(&parsed, s)
    }

    fn convert(self, quantity: &ParsedQuantity, raw: &str) -> Result<u64> {
        let factor = match self {
            ResourceKind::Cpu => 1000.0,
            ResourceKind::Memory => 1.0,
        };
        quantity
            .to_bytes_f64()
            .and_then(|v| scale_up(v, factor))
            .ok_or_else(|| RltopError::InvalidQuantity(raw.to_string()))
    }
}

/// `ceil(value * factor)`, saturating at `u64::MAX`.
///
/// Results within float noise of a whole number are taken as that number,
/// so `0.1 * 1000` is 100 and not 101.
fn scale_up(value: f64, factor: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = value * factor;
    let nearest = scaled.round();
    let whole = if (scaled - nearest).abs() < 1e-6 {
        nearest
    } else {
        scaled.ceil()
    };
    // float to int casts saturate
    Some(whole as u64)
}
