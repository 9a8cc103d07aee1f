use promptmux::prompt::selector::pick_weighted;
use promptmux::{PromptConfig, PromptRegistry};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn tally(registry: &mut PromptRegistry, intent: &str, draws: usize) -> Vec<(String, usize)> {
    let versions: Vec<String> = registry
        .configs(intent)
        .unwrap()
        .iter()
        .map(|c| c.version.clone())
        .collect();
    let mut counts: Vec<(String, usize)> = versions.into_iter().map(|v| (v, 0)).collect();
    for _ in 0..draws {
        let picked = registry.get_config(intent, None).unwrap().version.clone();
        if let Some(entry) = counts.iter_mut().find(|(v, _)| *v == picked) {
            entry.1 += 1;
        }
    }
    counts
}

#[test]
fn fifty_fifty_converges() {
    let mut registry = PromptRegistry::new().with_seed(17);
    registry
        .register(
            PromptConfig::new("greeting", "formal", "Be formal.")
                .with_version("formal")
                .with_weight(50),
        )
        .register(
            PromptConfig::new("greeting", "casual", "Be casual.")
                .with_version("casual")
                .with_weight(50),
        );

    let counts = tally(&mut registry, "greeting", 10_000);
    let formal = counts[0].1 as f64 / 10_000.0;
    assert!((formal - 0.5).abs() < 0.03, "formal share {}", formal);
}

#[test]
fn ninety_ten_converges() {
    let mut registry = PromptRegistry::new().with_seed(23);
    registry
        .register(PromptConfig::new("offer", "A", "a").with_version("a").with_weight(90))
        .register(PromptConfig::new("offer", "B", "b").with_version("b").with_weight(10));

    let counts = tally(&mut registry, "offer", 10_000);
    let a = counts[0].1 as f64 / 10_000.0;
    assert!((a - 0.9).abs() < 0.02, "a share {}", a);
}

#[test]
fn disabled_and_zero_weight_versions_are_never_picked() {
    let mut registry = PromptRegistry::new().with_seed(5);
    registry
        .register(PromptConfig::new("x", "on", "on").with_version("on").with_weight(10))
        .register(
            PromptConfig::new("x", "off", "off")
                .with_version("off")
                .with_weight(90)
                .with_enabled(false),
        )
        .register(PromptConfig::new("x", "zero", "zero").with_version("zero").with_weight(0));

    let counts = tally(&mut registry, "x", 2_000);
    assert_eq!(counts[0].1, 2_000);
    assert_eq!(counts[1].1, 0);
    assert_eq!(counts[2].1, 0);
}

#[test]
fn all_zero_weights_still_return_an_enabled_config() {
    let mut registry = PromptRegistry::new().with_seed(8);
    registry
        .register(PromptConfig::new("z", "a", "a").with_version("a").with_weight(0))
        .register(PromptConfig::new("z", "b", "b").with_version("b").with_weight(0))
        .register(PromptConfig::new("z", "c", "c").with_version("c").with_enabled(false));

    let counts = tally(&mut registry, "z", 1_000);
    assert!(counts[0].1 > 0 && counts[1].1 > 0);
    assert_eq!(counts[2].1, 0);
}

#[test]
fn selector_works_on_plain_slices() {
    let a = PromptConfig::new("i", "a", "a").with_weight(1);
    let b = PromptConfig::new("i", "b", "b").with_weight(0);
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        let picked = pick_weighted(&[&a, &b], |c| c.weight, &mut rng).unwrap();
        assert_eq!(picked.name, "a");
    }
}
