use super::priority::PriorityTier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One debtor row as read at the start of a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtorRecord {
    pub id: i64,
    pub name: String,
    pub debt_amount: f64,
    pub days_overdue: u32,
}

/// Full row used by listings; `priority` is `None` while the debtor is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtorRow {
    pub id: i64,
    pub name: String,
    pub debt_amount: f64,
    pub days_overdue: u32,
    pub priority: Option<PriorityTier>,
    pub collection_status: CollectionStatus,
    pub registered_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewDebtor {
    pub name: String,
    pub debt_amount: f64,
    pub days_overdue: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionStatus {
    #[default]
    NotContacted,
    Contacted,
    InProgress,
    Paid,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::NotContacted => "Not Contacted",
            CollectionStatus::Contacted => "Contacted",
            CollectionStatus::InProgress => "In Progress",
            CollectionStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CollectionStatus {
    type Err = String;

    // Accepts both the stored labels and CLI-friendly kebab case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "not contacted" => Ok(CollectionStatus::NotContacted),
            "contacted" => Ok(CollectionStatus::Contacted),
            "in progress" => Ok(CollectionStatus::InProgress),
            "paid" => Ok(CollectionStatus::Paid),
            _ => Err(format!("unknown collection status: {value}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_status_parses_stored_and_cli_forms() {
        assert_eq!("Not Contacted".parse::<CollectionStatus>(), Ok(CollectionStatus::NotContacted));
        assert_eq!("in-progress".parse::<CollectionStatus>(), Ok(CollectionStatus::InProgress));
        assert_eq!("PAID".parse::<CollectionStatus>(), Ok(CollectionStatus::Paid));
        assert!("archived".parse::<CollectionStatus>().is_err());
    }
}
