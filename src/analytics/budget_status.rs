//! Budget utilization for the analytics engine.
//!
//! Compares a category's spending in the filtered view against its assigned
//! monthly limit and classifies the ratio into display bands.

use std::collections::HashMap;

use serde::Serialize;

use crate::{category::CategoryId, expense::Expense};

/// The percentage reported when there is spending against a zero budget
/// limit. Finite, and large enough to land in [BudgetBand::Over].
pub const ZERO_LIMIT_OVERSPEND_PERCENTAGE: f64 = 999.0;

/// How much of a category's budget the filtered spending has consumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// The assigned monthly limit.
    pub limit: f64,
    /// The amount spent in the filtered view.
    pub spent: f64,
    /// `100 * spent / limit`, always finite. See
    /// [ZERO_LIMIT_OVERSPEND_PERCENTAGE] for the zero-limit case.
    pub percentage: f64,
}

/// The display bands for budget utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetBand {
    /// Spending is comfortably within the limit.
    Ok,
    /// Spending has reached 80% of the limit.
    Warning,
    /// Spending has reached or passed the limit.
    Over,
}

impl BudgetStatus {
    /// The display band for this status.
    ///
    /// The boundary values belong to the more severe band: exactly 80% is
    /// [BudgetBand::Warning] and exactly 100% is [BudgetBand::Over].
    pub fn band(&self) -> BudgetBand {
        if self.percentage >= 100.0 {
            BudgetBand::Over
        } else if self.percentage >= 80.0 {
            BudgetBand::Warning
        } else {
            BudgetBand::Ok
        }
    }
}

/// The budget utilization for `category` over the filtered view.
///
/// # Returns
/// `None` when no budget is assigned to the category, otherwise the limit,
/// the spending summed from expenses matching the category, and the
/// percentage of the limit consumed.
pub fn budget_status(
    category: &CategoryId,
    expenses: &[Expense],
    budgets: &HashMap<CategoryId, f64>,
) -> Option<BudgetStatus> {
    let limit = *budgets.get(category)?;

    let spent = expenses
        .iter()
        .filter(|e| e.amount.is_finite() && e.category == *category)
        .map(|e| e.amount)
        .sum();

    Some(BudgetStatus {
        limit,
        spent,
        percentage: percentage_of_limit(spent, limit),
    })
}

fn percentage_of_limit(spent: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        100.0 * spent / limit
    } else if spent > 0.0 {
        ZERO_LIMIT_OVERSPEND_PERCENTAGE
    } else {
        0.0
    }
}
