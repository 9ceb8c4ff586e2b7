//! Usage as a share of node allocatable or capacity

use crate::format::NOT_SET;
use crate::models::ResourceTotals;

/// `usage / total` as a whole percentage, rounded half away from zero.
/// Returns `None` when `total` is zero.
pub fn percent_of(usage: u64, total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    let (usage, total) = (u128::from(usage), u128::from(total));
    let rounded = (usage * 200 + total) / (total * 2);
    Some(u64::try_from(rounded).unwrap_or(u64::MAX))
}

fn render(usage: u64, total: u64) -> String {
    match percent_of(usage, total) {
        Some(p) => format!("{}%", p),
        None => NOT_SET.to_string(),
    }
}

/// CPU and memory percentages against a reference total.
///
/// A missing reference, or a zero total for one kind, renders `-` for that kind.
pub fn calculate_percentages(
    reference: Option<&ResourceTotals>,
    cpu_usage: u64,
    memory_usage: u64,
) -> (String, String) {
    match reference {
        Some(total) => (render(cpu_usage, total.cpu), render(memory_usage, total.memory)),
        None => (NOT_SET.to_string(), NOT_SET.to_string()),
    }
}
