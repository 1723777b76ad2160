//! Class-type distribution.
//!
//! Always reports every canonical category, in canonical order, so the
//! presentation layer can render a stable breakdown even for empty data.

use serde::Serialize;

use crate::types::{AttendanceRecord, ClassType};

/// Count and share of one class type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassTypeShare {
    pub class_type: ClassType,
    pub count: usize,
    /// Share of all sessions, 0-100
    pub percentage: f64,
}

/// Sessions broken down by class type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDistribution {
    pub total: usize,
    /// One entry per [`ClassType::ALL`], same order
    pub shares: Vec<ClassTypeShare>,
}

impl ClassDistribution {
    pub fn count(&self, class_type: ClassType) -> usize {
        self.shares[class_type.index()].count
    }

    pub fn percentage(&self, class_type: ClassType) -> f64 {
        self.shares[class_type.index()].percentage
    }

    /// Number of categories with at least one session.
    pub fn distinct_types(&self) -> usize {
        self.shares.iter().filter(|s| s.count > 0).count()
    }

    /// Distinct categories taught as a share of all canonical categories, 0-100.
    pub fn variety(&self) -> f64 {
        self.distinct_types() as f64 / ClassType::ALL.len() as f64 * 100.0
    }
}

/// Group `records` by class type.
pub fn class_distribution(records: &[AttendanceRecord]) -> ClassDistribution {
    let mut counts = [0usize; ClassType::ALL.len()];
    for record in records {
        counts[record.class_type().index()] += 1;
    }

    let total = records.len();
    let shares = ClassType::ALL
        .iter()
        .map(|&class_type| {
            let count = counts[class_type.index()];
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            ClassTypeShare {
                class_type,
                count,
                percentage,
            }
        })
        .collect();

    ClassDistribution { total, shares }
}
