use serde::{Deserialize, Serialize};

/// Severity band of a predicted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Safe,
    Medium,
    High,
}

impl RiskBand {
    pub const ALL: [RiskBand; 4] = [RiskBand::Low, RiskBand::Safe, RiskBand::Medium, RiskBand::High];

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Safe => "Safe Zone",
            RiskBand::Medium => "Medium Risk",
            RiskBand::High => "High Risk",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RiskBand::Low => "success",
            RiskBand::Safe => "info",
            RiskBand::Medium => "warning",
            RiskBand::High => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            RiskBand::Low => "🏆",
            RiskBand::Safe => "📈",
            RiskBand::Medium => "⚠️",
            RiskBand::High => "🚨",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RiskBand::Low => "Outstanding Achievement Potential",
            RiskBand::Safe => "Stable Progress",
            RiskBand::Medium => "Critical Threshold",
            RiskBand::High => "Urgent Academic Intervention",
        }
    }
}

/// Scenario rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    UnderperformingPotential,
    IneffectiveEffort,
    LifestyleFactor,
    MotivationEnvironment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackResult {
    pub risk_band: RiskBand,
    pub risk_label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    /// Rules that fired, in output order. Empty when the fallback was used.
    pub scenarios: Vec<Scenario>,
    pub parent_advice: Vec<String>,
    /// Teacher-only. Never rendered into parent-facing output.
    pub teacher_advice: Vec<String>,
    pub final_text_for_db: String,
}
