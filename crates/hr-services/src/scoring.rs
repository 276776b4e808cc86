//! Top employee scoring
//!
//! A weighted sum of two features, each min-max normalized across the
//! ranked population:
//!
//! ```text
//! score = w_attendance * attendance + w_training * training
//! ```

use hr_core::config::ScoringConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub attendance: f64,
    pub training: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            attendance: 0.6,
            training: 0.4,
        }
    }
}

impl From<ScoringConfig> for ScoreWeights {
    fn from(config: ScoringConfig) -> Self {
        Self {
            attendance: config.attendance_weight,
            training: config.training_weight,
        }
    }
}

/// Raw inputs for one employee
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeMetrics {
    pub employee_id: String,
    pub name: String,
    /// Total hours worked
    pub attendance_hours: f64,
    /// Number of completed trainings
    pub completed_trainings: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedEmployee {
    pub rank: usize,
    pub employee_id: String,
    pub name: String,
    pub attendance_hours: f64,
    pub completed_trainings: u32,
    /// Normalized attendance in [0, 1]
    pub attendance_score: f64,
    /// Normalized training in [0, 1]
    pub training_score: f64,
    pub score: f64,
}

/// Weighted score from already normalized features
pub fn calculate_score(attendance: f64, training: f64, weights: ScoreWeights) -> f64 {
    weights.attendance * attendance + weights.training * training
}

/// Min-max normalize into [0, 1].
///
/// A constant column carries no ranking signal, so every non-zero value
/// maps to 1.0 and zeros stay at 0.0.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };

    let (min, max) = values
        .iter()
        .copied()
        .map(finite)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    values
        .iter()
        .copied()
        .map(finite)
        .map(|v| {
            if range <= f64::EPSILON {
                if v == 0.0 {
                    0.0
                } else {
                    1.0
                }
            } else {
                (v - min) / range
            }
        })
        .collect()
}

/// Score and order a population, best first.
///
/// Ties are broken by employee id so the order is stable between calls.
pub fn rank_employees(metrics: Vec<EmployeeMetrics>, weights: ScoreWeights) -> Vec<RankedEmployee> {
    let attendance: Vec<f64> = metrics.iter().map(|m| m.attendance_hours).collect();
    let training: Vec<f64> = metrics
        .iter()
        .map(|m| f64::from(m.completed_trainings))
        .collect();
    let attendance = normalize(&attendance);
    let training = normalize(&training);

    let mut ranked: Vec<RankedEmployee> = metrics
        .into_iter()
        .zip(attendance.into_iter().zip(training))
        .map(|(m, (a, t))| RankedEmployee {
            rank: 0,
            employee_id: m.employee_id,
            name: m.name,
            attendance_hours: m.attendance_hours,
            completed_trainings: m.completed_trainings,
            attendance_score: a,
            training_score: t,
            score: calculate_score(a, t, weights),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });
    for (index, employee) in ranked.iter_mut().enumerate() {
        employee.rank = index + 1;
    }
    ranked
}
