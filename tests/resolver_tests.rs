//! Tests for the caching descriptor resolver

mod common;

use common::doubles::{StubController, UndescribableController};
use common::test_runtime::setup_may_runtime;
use monorail::controller::{Controller, ControllerContext, EngineContext};
use monorail::descriptor::{
    AsyncActionPair, DefaultDescriptorResolver, DescriptorBuilder, DescriptorResolver,
};
use monorail::handler::HandlerResponse;
use monorail::MonoRailError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Controller counting how often it is asked to describe itself.
struct CountingController {
    describes: Arc<AtomicUsize>,
}

impl Controller for CountingController {
    fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        builder.name("counting").action("index").async_action("export");
        Ok(())
    }

    fn process(
        &self,
        _engine: &EngineContext,
        _context: &mut ControllerContext,
    ) -> Result<HandlerResponse, MonoRailError> {
        Ok(HandlerResponse::text(200, "ok"))
    }
}

#[test]
fn test_cache_returns_same_descriptor() {
    let describes = Arc::new(AtomicUsize::new(0));
    let resolver = DefaultDescriptorResolver::new(true);

    let first = resolver
        .build_descriptor(&CountingController {
            describes: describes.clone(),
        })
        .unwrap();
    let second = resolver
        .build_descriptor(&CountingController {
            describes: describes.clone(),
        })
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(describes.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.size(), 1);
    assert!(first.action("export").unwrap().is_async());
}

#[test]
fn test_disabled_cache_describes_every_time() {
    let describes = Arc::new(AtomicUsize::new(0));
    let resolver = DefaultDescriptorResolver::new(false);
    let controller = CountingController {
        describes: describes.clone(),
    };

    let first = resolver.build_descriptor(&controller).unwrap();
    let second = resolver.build_descriptor(&controller).unwrap();

    assert_eq!(first, second);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(describes.load(Ordering::SeqCst), 2);
    assert_eq!(resolver.size(), 0);
}

#[test]
fn test_clear_evicts() {
    let describes = Arc::new(AtomicUsize::new(0));
    let resolver = DefaultDescriptorResolver::new(true);
    let controller = CountingController {
        describes: describes.clone(),
    };

    resolver.build_descriptor(&controller).unwrap();
    resolver.clear();
    assert_eq!(resolver.size(), 0);
    resolver.build_descriptor(&controller).unwrap();
    assert_eq!(describes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_descriptor_key_separates_instances_of_one_type() {
    let resolver = DefaultDescriptorResolver::new(true);
    let home = resolver
        .build_descriptor(&StubController::new("home").sync_action("index"))
        .unwrap();
    let feed = resolver
        .build_descriptor(
            &StubController::new("feed")
                .sessionless(true)
                .async_action("refresh"),
        )
        .unwrap();

    assert_eq!(resolver.size(), 2);
    assert_eq!(home.controller.name, "home");
    assert!(!home.is_sessionless());
    assert_eq!(feed.controller.name, "feed");
    assert!(feed.is_sessionless());
}

#[test]
fn test_concurrent_population_yields_one_entry() {
    setup_may_runtime();
    let describes = Arc::new(AtomicUsize::new(0));
    let resolver = Arc::new(DefaultDescriptorResolver::new(true));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let describes = Arc::clone(&describes);
            may::go!(move || {
                resolver
                    .build_descriptor(&CountingController { describes })
                    .unwrap()
            })
        })
        .collect();

    let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(resolver.size(), 1);
    assert!(describes.load(Ordering::SeqCst) >= 1);
    let cached = resolver
        .build_descriptor(&CountingController {
            describes: Arc::new(AtomicUsize::new(0)),
        })
        .unwrap();
    for descriptor in &descriptors {
        assert!(Arc::ptr_eq(descriptor, &cached));
    }
}

#[test]
fn test_describe_error_becomes_resolution_error() {
    let resolver = DefaultDescriptorResolver::new(true);
    let err = resolver
        .build_descriptor(&UndescribableController)
        .unwrap_err();
    match err {
        MonoRailError::DescriptorResolution { controller, reason } => {
            assert!(controller.ends_with("UndescribableController"));
            assert!(reason.contains("attributes unreadable"));
        }
        other => panic!("expected descriptor resolution error, got {other:?}"),
    }
    assert_eq!(resolver.size(), 0);
}

#[test]
fn test_malformed_declarations_are_rejected() {
    struct Malformed(fn(&mut DescriptorBuilder));

    impl Controller for Malformed {
        fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
            (self.0)(builder);
            Ok(())
        }

        fn process(
            &self,
            _engine: &EngineContext,
            _context: &mut ControllerContext,
        ) -> Result<HandlerResponse, MonoRailError> {
            Ok(HandlerResponse::text(200, "never"))
        }
    }

    let declarations: [fn(&mut DescriptorBuilder); 4] = [
        |b| {
            b.action("index");
        },
        |b| {
            b.name("dup").action("index").action("index");
        },
        |b| {
            b.name("blank").action("");
        },
        |b| {
            b.name("half").async_pair(AsyncActionPair::new("export", "begin_export", ""));
        },
    ];

    let resolver = DefaultDescriptorResolver::new(false);
    for declare in declarations {
        let err = resolver.build_descriptor(&Malformed(declare)).unwrap_err();
        assert!(
            matches!(err, MonoRailError::DescriptorResolution { .. }),
            "unexpected error {err:?}"
        );
    }
}
