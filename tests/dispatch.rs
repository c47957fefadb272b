use bytescan::{Catalog, ScanError, SimdInfo, SimdLevel, StrategyId, simd_info};

#[test]
fn test_catalog_lists_every_combination() {
    let catalog = Catalog::global();
    assert_eq!(catalog.len(), 14);
    for level in [SimdLevel::Sse2, SimdLevel::Avx2, SimdLevel::Avx512] {
        let shapes: Vec<_> = catalog
            .descriptors()
            .filter(|d| d.level == level)
            .map(|d| (d.unroll, d.prefetch.is_some()))
            .collect();
        assert_eq!(shapes.len(), 4, "{}", level);
        for shape in [(1, false), (1, true), (4, false), (4, true)] {
            assert!(shapes.contains(&shape), "{} missing {:?}", level, shape);
        }
    }
}

#[test]
fn test_resolution_follows_host_support() {
    let catalog = Catalog::global();
    let info = simd_info();
    for id in StrategyId::ALL {
        match catalog.resolve(id) {
            Ok(strategy) => {
                assert_eq!(strategy.id(), id);
                assert!(info.supports(id.level()));
            }
            Err(err) => {
                assert!(err.is_unsupported(), "{}: {}", id, err);
            }
        }
    }
    assert!(catalog.resolve(StrategyId::Scalar).is_ok());
    assert!(catalog.resolve(StrategyId::Memchr).is_ok());
}

#[test]
fn test_no_silent_fallback() {
    let catalog = Catalog::with_capabilities(SimdInfo::scalar_only());
    for id in [StrategyId::Avx512, StrategyId::Avx2Unroll, StrategyId::Sse2Prefetch] {
        match catalog.resolve(id) {
            Err(ScanError::UnsupportedIsa { strategy, required, .. }) => {
                assert_eq!(strategy, id.name());
                assert_eq!(required, id.level());
            }
            other => panic!("{} resolved to {:?}", id, other),
        }
    }
}

#[test]
fn test_resolve_by_name() {
    let catalog = Catalog::global();
    assert_eq!(
        catalog.resolve_name("find_byte_scalar").unwrap().id(),
        StrategyId::Scalar
    );
    assert!(matches!(
        catalog.resolve_name("find_byte_altivec"),
        Err(ScanError::UnknownStrategy(_))
    ));
}

#[test]
fn test_best_is_widest_supported_tier() {
    let catalog = Catalog::global();
    let best = catalog.best();
    assert_eq!(best.descriptor().level, catalog.capabilities().best_available());
    assert!(best.descriptor().prefetch.is_none());
    assert_ne!(best.id(), StrategyId::Memchr);
}
