// src/scoring/ensemble.rs — Per-set blending of ensemble member scores

use crate::infra::config::EnsembleConfig;

/// Tree-model weight for a set. Sets where the tree model historically
/// tracks graders better get the favored weight.
pub fn tree_weight(essay_set_id: u8, config: &EnsembleConfig) -> f64 {
    if config.tree_favored_sets.contains(&essay_set_id) {
        config.tree_weight_favored
    } else {
        config.tree_weight_default
    }
}

/// Weighted combination of whatever members produced a score. A lone
/// member passes through at full weight; no members yields `None`.
pub fn blend(
    tree: Option<f64>,
    sequence: Option<f64>,
    essay_set_id: u8,
    config: &EnsembleConfig,
) -> Option<f64> {
    match (tree, sequence) {
        (Some(t), Some(s)) => {
            let w = tree_weight(essay_set_id, config);
            Some(w * t + (1.0 - w) * s)
        }
        (Some(t), None) => Some(t),
        (None, Some(s)) => Some(s),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_tree_weight_per_set() {
        let config = EnsembleConfig::default();
        for id in [1u8, 2, 6] {
            assert!(close(tree_weight(id, &config), 0.6));
        }
        for id in [3u8, 4, 5, 7, 8, 0, 99] {
            assert!(close(tree_weight(id, &config), 0.4));
        }
    }

    #[test]
    fn test_blend_weights_both_members() {
        let config = EnsembleConfig::default();
        // favored set leans on the tree
        assert!(close(blend(Some(6.0), Some(8.0), 1, &config).unwrap(), 6.8));
        // default weighting leans on the sequence model
        assert!(close(blend(Some(6.0), Some(8.0), 3, &config).unwrap(), 7.2));
    }

    #[test]
    fn test_blend_single_member_passes_through() {
        let config = EnsembleConfig::default();
        assert!(close(blend(Some(4.2), None, 1, &config).unwrap(), 4.2));
        assert!(close(blend(None, Some(9.1), 1, &config).unwrap(), 9.1));
    }

    #[test]
    fn test_blend_no_members() {
        let config = EnsembleConfig::default();
        assert_eq!(blend(None, None, 1, &config), None);
    }
}
