//! Deficit narrative shown next to a recommendation.
//!
//! Reporting thresholds are looser than, and independent of, the decision
//! thresholds in the rule table.

use crate::types::DeficitVector;

/// Nitrogen deficit above which it is reported (kg/ha).
pub const N_REPORT_THRESHOLD: f64 = 20.0;
/// Phosphorus deficit above which it is reported (kg/ha).
pub const P_REPORT_THRESHOLD: f64 = 15.0;
/// Potassium deficit above which it is reported (kg/ha).
pub const K_REPORT_THRESHOLD: f64 = 15.0;

/// One clause per nutrient over its reporting threshold, or a maintenance
/// message naming the crop when none is.
pub fn explain(deficits: &DeficitVector, crop_type: &str) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if deficits.n_deficit > N_REPORT_THRESHOLD {
        clauses.push(format!("Nitrogen deficit: {:.0} kg/ha", deficits.n_deficit));
    }
    if deficits.p_deficit > P_REPORT_THRESHOLD {
        clauses.push(format!("Phosphorus deficit: {:.0} kg/ha", deficits.p_deficit));
    }
    if deficits.k_deficit > K_REPORT_THRESHOLD {
        clauses.push(format!("Potassium deficit: {:.0} kg/ha", deficits.k_deficit));
    }

    if clauses.is_empty() {
        format!("Soil nutrient levels adequate for {crop_type}. Maintenance fertilizer recommended.")
    } else {
        format!("Deficiencies detected: {}", clauses.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheat_example_omits_potassium_at_threshold() {
        let d = DeficitVector { n_deficit: 135.0, p_deficit: 40.0, k_deficit: 15.0 };
        assert_eq!(
            explain(&d, "Wheat"),
            "Deficiencies detected: Nitrogen deficit: 135 kg/ha, Phosphorus deficit: 40 kg/ha"
        );
    }

    #[test]
    fn test_maintenance_message_names_crop() {
        let d = DeficitVector { n_deficit: 20.0, p_deficit: 15.0, k_deficit: 0.0 };
        assert_eq!(
            explain(&d, "Barley"),
            "Soil nutrient levels adequate for Barley. Maintenance fertilizer recommended."
        );
    }

    #[test]
    fn test_potassium_only() {
        let d = DeficitVector { n_deficit: 0.0, p_deficit: 0.0, k_deficit: 15.6 };
        assert_eq!(explain(&d, "Cotton"), "Deficiencies detected: Potassium deficit: 16 kg/ha");
    }
}
