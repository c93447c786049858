//! Benefit figures forwarded to the chat function

use serde::{Deserialize, Serialize};

/// Read-only grounding for the assistant, produced by the benefit calculator.
///
/// The chat core never interprets these fields; they are serialized as-is
/// next to the message history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationContext {
    /// Average monthly net income before the birth, in euros
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_net_income: Option<f64>,
    /// Another young child lives in the household
    pub sibling_bonus: bool,
    /// Twins, triplets, ...
    pub multiple_birth: bool,
    /// Computed Basiselterngeld per month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_per_month: Option<f64>,
    /// Computed ElterngeldPlus per month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus_per_month: Option<f64>,
    /// Sum over the planned months
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_total: Option<f64>,
}

impl CalculationContext {
    /// True when the calculator has not produced anything yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
