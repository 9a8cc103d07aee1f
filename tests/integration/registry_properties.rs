use promptmux::{PromptConfig, PromptRegistry};
use proptest::prelude::*;

fn version_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["1.0", "2.0", "a", "b", "beta"]).prop_map(str::to_string)
}

proptest! {
    #[test]
    fn versions_stay_unique_and_last_write_wins(
        ops in prop::collection::vec((version_strategy(), 0u32..=100, "[a-z]{1,8}"), 1..40)
    ) {
        let mut registry = PromptRegistry::new();
        for (version, weight, name) in &ops {
            registry.register(
                PromptConfig::new("intent", name.clone(), "prompt")
                    .with_version(version.clone())
                    .with_weight(*weight),
            );
        }

        let configs = registry.configs("intent").unwrap();
        let mut seen: Vec<&str> = Vec::new();
        for config in configs {
            prop_assert!(!seen.contains(&config.version.as_str()));
            seen.push(&config.version);

            let last = ops.iter().rev().find(|(v, _, _)| *v == config.version).unwrap();
            prop_assert_eq!(&config.name, &last.2);
            prop_assert_eq!(config.weight, last.1);
        }

        // Position is fixed by first registration.
        let mut first_seen: Vec<&str> = Vec::new();
        for (version, _, _) in &ops {
            if !first_seen.contains(&version.as_str()) {
                first_seen.push(version);
            }
        }
        prop_assert_eq!(seen, first_seen);
    }

    #[test]
    fn intents_listed_in_first_registration_order(
        intents in prop::collection::vec("[a-e]", 1..20)
    ) {
        let mut registry = PromptRegistry::new();
        for intent in &intents {
            registry.register(PromptConfig::new(intent.clone(), "n", "p"));
        }
        let mut expected: Vec<&str> = Vec::new();
        for intent in &intents {
            if !expected.contains(&intent.as_str()) {
                expected.push(intent);
            }
        }
        prop_assert_eq!(registry.list_intents(), expected.clone());
        prop_assert_eq!(registry.len(), expected.len());
    }

    #[test]
    fn selection_only_returns_enabled_positive_weight_configs(
        arms in prop::collection::vec((0u32..=100, any::<bool>()), 1..8),
        seed in any::<u64>()
    ) {
        let mut registry = PromptRegistry::new().with_seed(seed);
        for (i, (weight, enabled)) in arms.iter().enumerate() {
            registry.register(
                PromptConfig::new("x", format!("arm{}", i), "p")
                    .with_version(i.to_string())
                    .with_weight(*weight)
                    .with_enabled(*enabled),
            );
        }
        let enabled: Vec<&(u32, bool)> = arms.iter().filter(|(_, e)| *e).collect();
        let any_positive = enabled.iter().any(|(w, _)| *w > 0);

        for _ in 0..20 {
            match registry.get_config("x", None) {
                None => prop_assert!(enabled.is_empty()),
                Some(config) => {
                    prop_assert!(config.enabled);
                    if any_positive && enabled.len() > 1 {
                        prop_assert!(config.weight > 0);
                    }
                }
            }
        }
    }
}
