use crate::error::RiskError;
use crate::models::debtor::DebtorRow;
use crate::models::priority::stored_tier_label;
use crate::models::risk_score::ScoredDebtor;
use crate::models::summary::{PortfolioStatistics, SummaryRow};

const RULE_WIDTH: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn format_banner(executed_at: &str) -> String {
    format!(
        "{rule}\nRisk Score Calculator\n{rule}\nExecution Time: {executed_at}\n{rule}",
        rule = rule()
    )
}

/// Format a scored debtor as one line
/// Format: "ID | name | Debt | Days | Score | Priority"
pub fn format_record_line(record: &ScoredDebtor) -> String {
    format!(
        "ID: {:>2} | {:<25} | Debt: {:>12} | Days: {:>3} | Score: {:>6.2} | Priority: {}",
        record.id,
        truncate(&record.name, 25),
        format_currency(record.debt_amount),
        record.days_overdue,
        record.score,
        record.priority_tier
    )
}

pub fn format_summary_table(rows: &[SummaryRow]) -> String {
    let mut lines = vec![rule(), "SUMMARY BY PRIORITY".to_string(), rule()];

    if rows.is_empty() {
        lines.push("No scored debtors.".to_string());
    }

    for row in rows {
        lines.push(format!(
            "{:<10} | Count: {:>3} | Total Debt: {}",
            row.tier,
            row.count,
            format_currency(row.total_debt)
        ));
    }

    lines.push(rule());
    lines.join("\n")
}

pub fn format_debtor_list(rows: &[DebtorRow]) -> String {
    if rows.is_empty() {
        return "No debtors found.".to_string();
    }

    rows.iter()
        .map(|row| {
            format!(
                "ID: {:>2} | {:<25} | Debt: {:>12} | Days: {:>3} | Priority: {:<7} | Status: {}",
                row.id,
                truncate(&row.name, 25),
                format_currency(row.debt_amount),
                row.days_overdue,
                stored_tier_label(row.priority),
                row.collection_status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_statistics(stats: &PortfolioStatistics) -> String {
    format!(
        "Debtors: {}\nTotal Debt: {}\nHigh: {}\nMedium: {}\nLow: {}\nPending: {}",
        stats.total_debtors,
        format_currency(stats.total_debt),
        stats.high,
        stats.medium,
        stats.low,
        stats
            .total_debtors
            .saturating_sub(stats.high + stats.medium + stats.low)
    )
}

/// Operator-facing failure text; connection failures name the attempted database.
pub fn format_failure(err: &RiskError) -> String {
    match err {
        RiskError::Connection { database, source } => format!(
            "✗ Error connecting to the debtor database: {source}\n\
             ✗ Failed to connect to database. Please check your configuration.\n\
             \x20  Database: {database}"
        ),
        RiskError::Update { .. } | RiskError::Commit { .. } | RiskError::Transaction(_) => {
            format!("✗ Error updating risk scores: {err}\n   No priority changes were saved.")
        }
        RiskError::Summary { updated, .. } => {
            format!("✗ {err}\n   {updated} priority changes were saved; no summary is available.")
        }
        other => format!("✗ {other}"),
    }
}

/// `$1,234,567.89`; negative amounts keep their sign ahead of the symbol.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
