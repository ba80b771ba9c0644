//! Integration tests for depth resolution across providers

use template_override::{resolve, MemoryProvider, ProviderChain, ResolutionError};

/// Provider A with one root, provider B with two, all defining page.html
fn scenario_chain() -> ProviderChain {
    ProviderChain::new()
        .with_provider(MemoryProvider::new("A").with_root("rootA1", [("page.html", "from A1")]))
        .with_provider(
            MemoryProvider::new("B")
                .with_root("rootB1", [("page.html", "from B1")])
                .with_root("rootB2", [("page.html", "from B2")]),
        )
}

#[test]
fn test_depth_one_is_first_provider() {
    let found = resolve(&scenario_chain(), "page.html", 1).expect("Should resolve");
    assert_eq!(found.origin, "rootA1/page.html");
    assert_eq!(found.content, "from A1");
}

#[test]
fn test_depth_two_moves_to_next_provider() {
    let found = resolve(&scenario_chain(), "page.html", 2).expect("Should resolve");
    assert_eq!(found.origin, "rootB1/page.html");
}

#[test]
fn test_depth_three_continues_within_provider() {
    let found = resolve(&scenario_chain(), "page.html", 3).expect("Should resolve");
    assert_eq!(found.origin, "rootB2/page.html");
}

#[test]
fn test_depth_past_all_matches() {
    let result = resolve(&scenario_chain(), "page.html", 4);
    assert!(matches!(result, Err(ResolutionError::NotFound { name }) if name == "page.html"));
}

#[test]
fn test_repeated_resolution_is_stable() {
    let chain = scenario_chain();
    for depth in 1..=3 {
        let first = resolve(&chain, "page.html", depth).expect("Should resolve");
        let second = resolve(&chain, "page.html", depth).expect("Should resolve");
        assert_eq!(first, second);
    }
}

#[test]
fn test_roots_without_the_name_are_skipped() {
    let chain = ProviderChain::new()
        .with_provider(
            MemoryProvider::new("A")
                .with_root("empty", [("other.html", "x")])
                .with_root("full", [("page.html", "A")]),
        )
        .with_provider(MemoryProvider::new("B").with_root("b", [("page.html", "B")]));

    assert_eq!(chain.count_matches("page.html"), 2);
    assert_eq!(resolve(&chain, "page.html", 1).unwrap().origin, "full/page.html");
    assert_eq!(resolve(&chain, "page.html", 2).unwrap().origin, "b/page.html");
}

#[test]
fn test_provider_without_matches_does_not_consume_depth() {
    let chain = ProviderChain::new()
        .with_provider(MemoryProvider::new("empty"))
        .with_provider(MemoryProvider::new("B").with_root("b", [("page.html", "B")]));

    assert_eq!(resolve(&chain, "page.html", 1).unwrap().content, "B");
    assert!(resolve(&chain, "page.html", 2).is_err());
}
