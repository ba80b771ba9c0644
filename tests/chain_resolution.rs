//! Integration tests for walking and merging override chains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use template_override::template::Violation;
use template_override::{
    resolve_chain, CompileOptions, Context, Match, MemoryProvider, ProviderChain,
    ResolutionError, SearchProvider,
};

/// Wraps a provider and counts how many lookups reach it
#[derive(Debug)]
struct CountingProvider {
    inner: MemoryProvider,
    lookups: Arc<AtomicUsize>,
}

impl SearchProvider for CountingProvider {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn matches<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = Match> + 'a> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.matches(name)
    }
}

fn walk(chain: &ProviderChain, name: &str) -> Result<template_override::ResolvedChain, ResolutionError> {
    resolve_chain(chain, name, &Context::new(), &CompileOptions::default())
}

fn override_of(name: &str, body: &str) -> String {
    format!(r#"{{% override "{}" %}}{{% block a %}}{}{{% endblock %}}"#, name, body)
}

#[test]
fn test_three_layer_chain_across_providers() {
    let chain = ProviderChain::new()
        .with_provider(
            MemoryProvider::new("A").with_root("rootA1", [("page.html", override_of("page.html", "A1"))]),
        )
        .with_provider(
            MemoryProvider::new("B")
                .with_root("rootB1", [("page.html", override_of("page.html", "B1"))])
                .with_root("rootB2", [("page.html", "{% block a %}B2{% endblock %}".to_string())]),
        );

    let resolved = walk(&chain, "page.html").expect("Should resolve");

    let origins: Vec<_> = resolved.layers().iter().map(|l| l.origin.as_str()).collect();
    assert_eq!(origins, vec!["rootA1/page.html", "rootB1/page.html", "rootB2/page.html"]);
    assert_eq!(resolved.root.origin, "rootB2/page.html");
    assert!(resolved.root.is_root());

    let bodies: Vec<_> = resolved.table.get("a").unwrap().iter().map(|b| b.depth).collect();
    assert_eq!(bodies, vec![1, 2, 3]);
}

#[test]
fn test_divergence_at_second_layer() {
    let chain = ProviderChain::new()
        .with_provider(
            MemoryProvider::new("A").with_root("rootA1", [("page.html", override_of("page.html", "A1"))]),
        )
        .with_provider(
            MemoryProvider::new("B")
                .with_root("rootB1", [("page.html", override_of("other.html", "B1"))])
                .with_root("rootB2", [("page.html", "root".to_string())]),
        );

    match walk(&chain, "page.html") {
        Err(ResolutionError::DivergentChain {
            expected,
            found,
            origin,
        }) => {
            assert_eq!(expected, "page.html");
            assert_eq!(found, "other.html");
            assert_eq!(origin, "rootB1/page.html");
        }
        other => panic!("Expected divergent chain, got {:?}", other),
    }
}

#[test]
fn test_percent_in_name_keeps_the_redirect() {
    let chain = ProviderChain::new().with_provider(
        MemoryProvider::new("A")
            .with_root("r1", [("50%.html", r#"{% override "50%.html" %}{% block a %}top{% endblock %}"#)])
            .with_root("r2", [("50%.html", "[{% block a %}base{% endblock %}]")]),
    );

    let resolved = walk(&chain, "50%.html").expect("Should resolve");
    assert_eq!(resolved.table.layer_count(), 2);
    assert_eq!(resolved.root.origin, "r2/50%.html");
    assert_eq!(
        template_override::render(&chain, "50%.html", &Context::new()).unwrap(),
        "[top]"
    );
}

#[test]
fn test_single_definition_is_one_layer() {
    let chain = ProviderChain::new()
        .with_provider(MemoryProvider::new("A").with_root("r", [("page.html", "{% block a %}x{% endblock %}")]));
    let resolved = walk(&chain, "page.html").expect("Should resolve");
    assert_eq!(resolved.table.layer_count(), 1);
}

#[test]
fn test_k_layers_take_exactly_k_lookups() {
    for k in 1..=5 {
        let mut provider = MemoryProvider::new("mem");
        for i in 1..k {
            provider = provider.with_root(format!("r{}", i), [("page.html", override_of("page.html", "x"))]);
        }
        provider = provider.with_root(format!("r{}", k), [("page.html", "root".to_string())]);

        let lookups = Arc::new(AtomicUsize::new(0));
        let chain = ProviderChain::new().with_provider(CountingProvider {
            inner: provider,
            lookups: Arc::clone(&lookups),
        });

        let resolved = walk(&chain, "page.html").expect("Should resolve");
        assert_eq!(resolved.table.layer_count(), k);
        assert_eq!(lookups.load(Ordering::SeqCst), k);
    }
}

#[test]
fn test_two_redirects_are_rejected() {
    let source = r#"{% override "page.html" %}{% override "page.html" %}"#;
    for options in [
        CompileOptions::default(),
        CompileOptions::new().with_redirect_must_be_first(false),
    ] {
        let chain = ProviderChain::new()
            .with_provider(MemoryProvider::new("A").with_root("r1", [("page.html", source)]).with_root("r2", [("page.html", "root")]));
        let result = resolve_chain(&chain, "page.html", &Context::new(), &options);
        assert!(matches!(
            result,
            Err(ResolutionError::StructuralViolation {
                violation: Violation::DuplicateRedirect,
                ..
            })
        ));
    }
}

#[test]
fn test_late_redirect_depends_on_policy() {
    let chain = ProviderChain::new().with_provider(
        MemoryProvider::new("A")
            .with_root("r1", [("page.html", r#"{% block a %}top{% endblock %}{% override "page.html" %}"#)])
            .with_root("r2", [("page.html", "{% block a %}base{% endblock %}")]),
    );

    assert!(matches!(
        walk(&chain, "page.html"),
        Err(ResolutionError::StructuralViolation {
            violation: Violation::MisplacedRedirect,
            ..
        })
    ));

    let relaxed = CompileOptions::new().with_redirect_must_be_first(false);
    let resolved = resolve_chain(&chain, "page.html", &Context::new(), &relaxed).expect("Should resolve");
    assert_eq!(resolved.table.layer_count(), 2);
}

#[test]
fn test_missing_target_differs_from_not_found() {
    let chain = ProviderChain::new().with_provider(
        MemoryProvider::new("A").with_root("r1", [("page.html", override_of("page.html", "x"))]),
    );

    assert!(matches!(
        walk(&chain, "page.html"),
        Err(ResolutionError::MissingOverrideTarget { depth: 2, .. })
    ));
    assert!(matches!(
        walk(&chain, "absent.html"),
        Err(ResolutionError::NotFound { .. })
    ));
}

#[test]
fn test_deferred_target_errors() {
    let chain = ProviderChain::new().with_provider(
        MemoryProvider::new("A")
            .with_root("r1", [("page.html", "{% override layout.name %}")])
            .with_root("r2", [("page.html", "root")]),
    );

    let undefined = resolve_chain(&chain, "page.html", &Context::new(), &CompileOptions::default());
    assert!(matches!(undefined, Err(ResolutionError::InvalidTarget { .. })));

    let numeric = Context::from_toml_str("[layout]\nname = 3").unwrap();
    let result = resolve_chain(&chain, "page.html", &numeric, &CompileOptions::default());
    assert!(matches!(result, Err(ResolutionError::InvalidTarget { .. })));

    let valid = Context::from_toml_str("[layout]\nname = \"page.html\"").unwrap();
    let resolved = resolve_chain(&chain, "page.html", &valid, &CompileOptions::default())
        .expect("Should resolve");
    assert_eq!(resolved.table.layer_count(), 2);
}

#[test]
fn test_concurrent_resolutions_share_a_chain() {
    let chain = ProviderChain::new().with_provider(
        MemoryProvider::new("A")
            .with_root("r1", [("page.html", override_of("page.html", "top"))])
            .with_root("r2", [("page.html", "{% block a %}base{% endblock %}".to_string())]),
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| walk(&chain, "page.html").map(|r| r.table.layer_count())))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 2);
        }
    });
}
