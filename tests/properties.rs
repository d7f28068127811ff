//! Property tests for the forward evaluator and activation functions.

use proptest::prelude::*;
use replicant_matrix::{
    forward_sigmoid, relu, sigmoid, EngineConfig, ForwardEvaluator, MatrixBlueprint,
    ReplicantMatrix,
};

fn finite() -> impl Strategy<Value = f32> {
    -1.0e3_f32..1.0e3_f32
}

proptest! {
    #[test]
    fn output_equals_input_times_prior_bias_plus_weight(
        input in finite(),
        bias in finite(),
        weight in finite(),
        carry in any::<bool>(),
    ) {
        let blueprint = MatrixBlueprint::new()
            .with_input(1, input)
            .with_output(2, bias)
            .with_interaction(0, 1, 2, weight);
        let mut matrix = ReplicantMatrix::from_blueprint(&blueprint).unwrap();
        let config = if carry { EngineConfig::legacy_carry() } else { EngineConfig::raw() };

        let bias_before_update = matrix.outputs().next().unwrap().carried_bias();
        ForwardEvaluator::new(config).evaluate(&mut matrix);

        let node = matrix.outputs().next().unwrap();
        prop_assert_eq!(node.value(), input * bias_before_update * 1.0 + weight);
        prop_assert_eq!(node.bias(), bias);
    }

    #[test]
    fn inert_matrix_values_never_change(
        input in finite(),
        bias in finite(),
        initial in finite(),
        passes in 1usize..5,
    ) {
        let mut blueprint = MatrixBlueprint::new()
            .with_input(1, input)
            .with_output(2, bias)
            .allow_inert();
        blueprint.outputs[0].value = initial;
        let mut matrix = ReplicantMatrix::from_blueprint(&blueprint).unwrap();

        let evaluator = ForwardEvaluator::new(EngineConfig::legacy_carry());
        for _ in 0..passes {
            prop_assert_eq!(evaluator.evaluate(&mut matrix), 0);
        }
        prop_assert_eq!(matrix.to_blueprint(), blueprint);
    }

    #[test]
    fn static_mode_repeats_exactly(
        inputs in prop::collection::vec(finite(), 1..6),
        seed_weight in finite(),
    ) {
        let mut blueprint = MatrixBlueprint::new().with_output(100, 0.5);
        for (i, &value) in inputs.iter().enumerate() {
            let id = i as u32 + 1;
            blueprint = blueprint
                .with_input(id, value)
                .with_interaction(id, id, 100, seed_weight / id as f32);
        }
        let mut matrix = ReplicantMatrix::from_blueprint(&blueprint).unwrap();
        let evaluator = ForwardEvaluator::default();

        evaluator.evaluate(&mut matrix);
        let first = matrix.output_values();
        evaluator.evaluate(&mut matrix);
        prop_assert_eq!(first, matrix.output_values());
    }

    #[test]
    fn relu_is_identity_or_zero(x in any::<f32>().prop_filter("not NaN", |x| !x.is_nan())) {
        if x >= 0.0 {
            prop_assert_eq!(relu(x), x);
        } else {
            prop_assert_eq!(relu(x), 0.0);
        }
    }

    #[test]
    fn sigmoids_stay_in_unit_interval(x in -80.0_f32..80.0) {
        let a = sigmoid(x);
        let b = forward_sigmoid(x);
        prop_assert!((0.0..=1.0).contains(&a));
        prop_assert!((0.0..=1.0).contains(&b));
        prop_assert!((a - forward_sigmoid(-x)).abs() < 1e-6);
    }
}

#[test]
fn relu_handles_infinities() {
    assert_eq!(relu(f32::INFINITY), f32::INFINITY);
    assert_eq!(relu(f32::NEG_INFINITY), 0.0);
}
