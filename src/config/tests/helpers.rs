//! Layer composition for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::MagpieConfig;

/// Where a test layer claims to come from, lowest precedence first.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    Defaults,
    File,
    Environment,
    Cli,
}

impl Source {
    fn push(self, composer: &mut MergeComposer, value: Value) {
        match self {
            Self::Defaults => composer.push_defaults(value),
            Self::File => composer.push_file(value, None),
            Self::Environment => composer.push_environment(value),
            Self::Cli => composer.push_cli(value),
        }
    }
}

/// Merges `layers` in order into a [`MagpieConfig`].
pub fn compose(layers: &[(Source, Value)]) -> MagpieConfig {
    let mut composer = MergeComposer::new();
    for (source, value) in layers {
        source.push(&mut composer, value.clone());
    }
    MagpieConfig::merge_from_layers(composer.layers()).expect("layers should merge")
}
