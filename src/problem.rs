//! Problem builder: dataset to engine training format
//!
//! Converts a validated dataset into the sentinel-terminated sparse-vector
//! form the regression engine consumes. Internally the crate keeps explicit
//! lengths; the terminator convention only exists at the engine boundary.

use crate::core::{Dataset, SvmNode, TrainingProblem};

/// Build the single-feature vector for one input value.
///
/// The engine sees every sample as a sparse vector with one feature at
/// index 1 followed by the end-of-vector terminator.
pub fn feature_vector(input: f64) -> Vec<SvmNode> {
    vec![SvmNode::new(1, input), SvmNode::terminator()]
}

/// Build a training problem from a dataset, preserving sample order.
pub fn build_problem(dataset: &Dataset) -> TrainingProblem {
    let nodes = dataset.inputs().iter().map(|&x| feature_vector(x)).collect();
    let labels = dataset.targets().to_vec();
    TrainingProblem::from_parts(nodes, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TERMINATOR_INDEX;

    #[test]
    fn test_feature_vector_shape() {
        let v = feature_vector(0.9);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].index, 1);
        assert_eq!(v[0].value, 0.9);
        assert!(v[1].is_terminator());
    }

    #[test]
    fn test_problem_sentinel_convention() {
        let dataset = Dataset::new(vec![0.3, 0.5, 0.7], vec![14.2, 13.8, 13.1]).unwrap();
        let problem = build_problem(&dataset);

        assert_eq!(problem.len(), 3);
        for v in problem.nodes() {
            let (last, rest) = v.split_last().unwrap();
            assert_eq!(last.index, TERMINATOR_INDEX);
            for node in rest {
                assert_eq!(node.index, 1);
                assert!(node.value.is_finite());
            }
        }
    }

    #[test]
    fn test_problem_preserves_order() {
        let dataset = Dataset::new(vec![1.5, 0.3, 0.9], vec![8.0, 14.2, 12.0]).unwrap();
        let problem = build_problem(&dataset);

        let inputs: Vec<f64> = problem.nodes().iter().map(|v| v[0].value).collect();
        assert_eq!(inputs, vec![1.5, 0.3, 0.9]);
        assert_eq!(problem.labels(), &[8.0, 14.2, 12.0]);
    }
}
