//! Wage configuration model and related types.
//!
//! A [`WageConfiguration`] is the per-employee input to the component
//! resolver: a monthly wage, a set of named component rules, and the
//! deduction parameters. Tenants migrated from the legacy schema have an
//! empty rule set and carry stored `basic`/`allowances` amounts instead;
//! the two shapes are told apart once, at load time, via
//! [`WageConfiguration::plan`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The kind of wage a configuration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WageType {
    /// A fixed monthly wage. Currently the only supported kind.
    Fixed,
}

/// How a single named component of the wage is derived.
///
/// # Example
///
/// ```
/// use payroll_engine::models::ComponentRule;
/// use rust_decimal::Decimal;
///
/// let rule = ComponentRule::PercentageOfWage(Decimal::from(50));
/// let json = serde_json::to_string(&rule).unwrap();
/// assert_eq!(json, r#"{"type":"percentage_of_wage","value":"50"}"#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ComponentRule {
    /// A percentage (0-100, larger values accepted) of the monthly wage.
    PercentageOfWage(Decimal),
    /// A percentage of the already-resolved basic component.
    PercentageOfBasic(Decimal),
    /// A flat amount in the tenant currency.
    FixedAmount(Decimal),
    /// Absorbs whatever wage is left after all other components.
    ///
    /// Only meaningful for the catch-all component (`fixed_allowance`),
    /// which is resolved last.
    RemainingAmount,
}

/// The authoritative wage configuration for one employee.
///
/// Exactly one configuration is authoritative at computation time: the
/// latest by `created_at`. The legacy fields `basic` and `allowances` are
/// only consulted when `component_rules` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageConfiguration {
    /// Unique identifier for this configuration version.
    pub id: Uuid,
    /// The tenant this configuration belongs to.
    pub tenant_id: String,
    /// The employee this configuration applies to.
    pub employee_id: String,
    /// The monthly gross wage in the tenant currency.
    pub wage: Decimal,
    /// The kind of wage.
    pub wage_type: WageType,
    /// Named component rules; empty means the legacy schema is in effect.
    #[serde(default)]
    pub component_rules: BTreeMap<String, ComponentRule>,
    /// Provident-fund rate (0-100), applied to basic for both employee
    /// and employer contributions.
    pub deduction_rate: Decimal,
    /// Flat monthly deduction (e.g. professional tax).
    pub fixed_deduction: Decimal,
    /// Legacy stored basic amount, used only when `component_rules` is empty.
    #[serde(default)]
    pub basic: Decimal,
    /// Legacy stored allowances, used only when `component_rules` is empty.
    #[serde(default)]
    pub allowances: BTreeMap<String, Decimal>,
    /// When this configuration version was created.
    pub created_at: DateTime<Utc>,
}

/// A wage configuration classified at load time into one of the two schema
/// generations, so the resolver has one entry point per variant instead of
/// re-checking "is the rule map empty" throughout.
#[derive(Debug, Clone, PartialEq)]
pub enum CompensationPlan<'a> {
    /// The current schema: named rules resolved against the wage.
    RuleBased {
        /// The monthly wage (guaranteed > 0).
        wage: Decimal,
        /// The named component rules.
        rules: &'a BTreeMap<String, ComponentRule>,
    },
    /// The legacy schema: stored basic and allowance amounts taken verbatim.
    Legacy {
        /// The monthly wage (may be zero for very old records).
        wage: Decimal,
        /// The stored basic amount.
        basic: Decimal,
        /// The stored allowance amounts, keyed by historical spellings.
        allowances: &'a BTreeMap<String, Decimal>,
    },
}

impl WageConfiguration {
    /// Classifies this configuration into a [`CompensationPlan`].
    ///
    /// Rejects non-positive wages for rule-based configurations and
    /// negative wages for legacy ones (a legacy wage of zero is tolerated:
    /// gross falls back to `basic + Σallowances`).
    pub fn plan(&self) -> EngineResult<CompensationPlan<'_>> {
        if self.component_rules.is_empty() {
            if self.wage < Decimal::ZERO {
                return Err(EngineError::NotComputable {
                    employee_id: self.employee_id.clone(),
                    reason: "wage must not be negative".to_string(),
                });
            }
            Ok(CompensationPlan::Legacy {
                wage: self.wage,
                basic: self.basic,
                allowances: &self.allowances,
            })
        } else {
            if self.wage <= Decimal::ZERO {
                return Err(EngineError::NotComputable {
                    employee_id: self.employee_id.clone(),
                    reason: "wage must be greater than zero".to_string(),
                });
            }
            Ok(CompensationPlan::RuleBased {
                wage: self.wage,
                rules: &self.component_rules,
            })
        }
    }
}
