use serde::{Deserialize, Serialize};

/// Which statistic a card contributes as its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValueMetric {
    /// Forgetting-curve retrievability in [0, 1].
    #[default]
    Retention,
    /// Stability minus elapsed days (can go negative for overdue cards).
    StabilityRemaining,
    /// Raw stability, in days.
    StabilityDays,
}

/// Which statistic a card contributes as its weight (rectangle area,
/// averaging denominator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeightMetric {
    /// Every card counts as 1.
    Count,
    /// Harder cards take more area.
    #[default]
    Difficulty,
}

/// Built-in colormap families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorStyle {
    #[default]
    Goldie,
    BlueSea,
}

/// Explicit display configuration, passed into aggregation and layout.
/// Never read from ambient/global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayOptions {
    pub value: ValueMetric,
    pub weight: WeightMetric,
    pub style: ColorStyle,
    /// Evaluation time override (Unix seconds). `None` means wall clock,
    /// re-read on every statistics pass.
    pub time_override: Option<f64>,
}

impl DisplayOptions {
    /// The evaluation time for a statistics pass.
    pub fn eval_time(&self) -> f64 {
        match self.time_override {
            Some(t) => t,
            None => std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
        }
    }
}
