//! Evaluation policy for the forward evaluator and population stepping.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;

/// Which bias value an output node contributes to its own update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BiasMode {
    /// Read the configured bias every time. Repeated passes over unchanged
    /// inputs produce identical outputs.
    #[default]
    Static,
    /// Read the node's carried accumulator, then overwrite it with the value
    /// just written. Each pass (and each later edge sharing the same output
    /// within a pass) sees the previous result as its bias.
    Carry,
}

/// Configuration for [`ForwardEvaluator`](crate::ForwardEvaluator) and
/// [`Population`](crate::Population).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Post-processing applied to every raw edge result.
    pub activation: Activation,
    /// Bias source for each edge update.
    pub bias_mode: BiasMode,
    /// Populations with fewer agents than this are stepped on the calling thread.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation: Activation::Identity,
            bias_mode: BiasMode::Static,
            parallel_threshold: 64,
        }
    }
}

impl EngineConfig {
    /// Raw linear combinations with static biases.
    #[must_use]
    pub fn raw() -> Self {
        Self::default()
    }

    /// Raw linear combinations with the bias-as-accumulator behaviour.
    #[must_use]
    pub fn legacy_carry() -> Self {
        Self {
            bias_mode: BiasMode::Carry,
            ..Default::default()
        }
    }

    /// Static biases with `activation` applied to every edge result.
    #[must_use]
    pub fn with_activation(activation: Activation) -> Self {
        Self {
            activation,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let raw = EngineConfig::raw();
        assert_eq!(raw.activation, Activation::Identity);
        assert_eq!(raw.bias_mode, BiasMode::Static);

        let carry = EngineConfig::legacy_carry();
        assert_eq!(carry.bias_mode, BiasMode::Carry);
        assert_eq!(carry.activation, Activation::Identity);

        let relu = EngineConfig::with_activation(Activation::ReLU);
        assert_eq!(relu.activation, Activation::ReLU);
        assert_eq!(relu.parallel_threshold, raw.parallel_threshold);
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let json = r#"{"activation":"Sigmoid","bias_mode":"Carry","parallel_threshold":8}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.activation, Activation::Sigmoid);
        assert_eq!(config.bias_mode, BiasMode::Carry);
        assert_eq!(config.parallel_threshold, 8);
    }
}
