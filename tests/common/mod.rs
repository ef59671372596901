#![allow(dead_code)]

pub mod test_runtime {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod test_tracing {
    /// Route events from the current test thread to the test writer.
    pub fn init() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

pub mod doubles {
    use http::Method;
    use monorail::controller::{
        Controller, ControllerContext, ControllerContextFactory, ControllerFactory,
        DefaultControllerContextFactory, EngineContext,
    };
    use monorail::descriptor::{
        ActionDescriptor, AsyncActionPair, ControllerDescriptor, ControllerMetaDescriptor,
        DescriptorBuilder, DescriptorResolver,
    };
    use monorail::handler::HandlerResponse;
    use monorail::routing::{RequestContext, RouteMatch};
    use monorail::MonoRailError;
    use std::borrow::Cow;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Controller whose declaration and behaviour are plain data.
    ///
    /// Every phase it runs is appended to `calls` as `phase:action`.
    pub struct StubController {
        pub name: String,
        pub area: String,
        pub sessionless: bool,
        pub actions: Vec<ActionDescriptor>,
        pub calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubController {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                area: String::new(),
                sessionless: false,
                actions: Vec::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn sessionless(mut self, sessionless: bool) -> Self {
            self.sessionless = sessionless;
            self
        }

        pub fn area(mut self, area: &str) -> Self {
            self.area = area.to_string();
            self
        }

        pub fn sync_action(mut self, name: &str) -> Self {
            self.actions.push(ActionDescriptor::sync(name));
            self
        }

        pub fn async_action(mut self, name: &str) -> Self {
            self.actions
                .push(ActionDescriptor::Async(AsyncActionPair::conventional(name)));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, phase: &str, context: &ControllerContext) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{phase}:{}", context.action()));
        }
    }

    impl Controller for StubController {
        fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
            builder
                .name(self.name.clone())
                .area(self.area.clone())
                .sessionless(self.sessionless);
            for action in &self.actions {
                match action {
                    ActionDescriptor::Sync { name } => builder.action(name.clone()),
                    ActionDescriptor::Async(pair) => builder.async_pair(pair.clone()),
                };
            }
            Ok(())
        }

        fn process(
            &self,
            _engine: &EngineContext,
            context: &mut ControllerContext,
        ) -> Result<HandlerResponse, MonoRailError> {
            self.record("process", context);
            Ok(HandlerResponse::text(200, format!("sync {}", context.action())))
        }

        fn begin_process(
            &self,
            _engine: &EngineContext,
            context: &mut ControllerContext,
        ) -> Result<(), MonoRailError> {
            self.record("begin", context);
            context
                .property_bag_mut()
                .insert("begun_on_coroutine".into(), may::coroutine::is_coroutine().into());
            Ok(())
        }

        fn end_process(
            &self,
            _engine: &EngineContext,
            context: &mut ControllerContext,
        ) -> Result<HandlerResponse, MonoRailError> {
            self.record("end", context);
            let on_coroutine = context
                .property_bag()
                .get("begun_on_coroutine")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            Ok(HandlerResponse::text(
                200,
                format!("async {} (coroutine: {on_coroutine})", context.action()),
            ))
        }

        fn descriptor_key(&self) -> Cow<'static, str> {
            Cow::Owned(format!("stub:{}/{}", self.area, self.name))
        }
    }

    /// Controller that panics in every phase.
    pub struct PanickingController;

    impl Controller for PanickingController {
        fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
            builder.name("panicky").action("index").async_action("export");
            Ok(())
        }

        fn process(
            &self,
            _engine: &EngineContext,
            _context: &mut ControllerContext,
        ) -> Result<HandlerResponse, MonoRailError> {
            panic!("process exploded");
        }

        fn begin_process(
            &self,
            _engine: &EngineContext,
            _context: &mut ControllerContext,
        ) -> Result<(), MonoRailError> {
            panic!("begin exploded");
        }
    }

    /// Controller whose self-description is rejected.
    pub struct UndescribableController;

    impl Controller for UndescribableController {
        fn describe(&self, _builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
            Err(MonoRailError::Config("attributes unreadable".to_string()))
        }

        fn process(
            &self,
            _engine: &EngineContext,
            _context: &mut ControllerContext,
        ) -> Result<HandlerResponse, MonoRailError> {
            Ok(HandlerResponse::text(200, "unreachable"))
        }
    }

    /// Controller factory over fixed instances, counting lookups.
    #[derive(Default)]
    pub struct StubControllerFactory {
        controllers: HashMap<(String, String), Arc<dyn Controller>>,
        pub lookups: AtomicUsize,
    }

    impl StubControllerFactory {
        pub fn with(mut self, area: &str, name: &str, controller: Arc<dyn Controller>) -> Self {
            self.controllers
                .insert((area.to_string(), name.to_string()), controller);
            self
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    impl ControllerFactory for StubControllerFactory {
        fn create_controller(
            &self,
            area: &str,
            name: &str,
        ) -> Result<Arc<dyn Controller>, MonoRailError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.controllers
                .get(&(area.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| MonoRailError::ControllerNotFound {
                    area: area.to_string(),
                    name: name.to_string(),
                })
        }
    }

    /// Controller factory that parks the calling coroutine before every lookup,
    /// standing in for a factory backed by I/O.
    pub struct SleepingControllerFactory {
        inner: StubControllerFactory,
        delay: Duration,
    }

    impl SleepingControllerFactory {
        pub fn new(inner: StubControllerFactory, delay: Duration) -> Self {
            Self { inner, delay }
        }

        pub fn lookups(&self) -> usize {
            self.inner.lookups()
        }
    }

    impl ControllerFactory for SleepingControllerFactory {
        fn create_controller(
            &self,
            area: &str,
            name: &str,
        ) -> Result<Arc<dyn Controller>, MonoRailError> {
            may::coroutine::sleep(self.delay);
            self.inner.create_controller(area, name)
        }
    }

    /// Resolver handing out a preset descriptor regardless of the controller.
    pub struct FixedDescriptorResolver {
        descriptor: Arc<ControllerMetaDescriptor>,
        pub calls: AtomicUsize,
    }

    impl FixedDescriptorResolver {
        pub fn new(descriptor: ControllerMetaDescriptor) -> Self {
            Self {
                descriptor: Arc::new(descriptor),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn descriptor(&self) -> &Arc<ControllerMetaDescriptor> {
            &self.descriptor
        }
    }

    impl DescriptorResolver for FixedDescriptorResolver {
        fn build_descriptor(
            &self,
            _controller: &dyn Controller,
        ) -> Result<Arc<ControllerMetaDescriptor>, MonoRailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&self.descriptor))
        }
    }

    /// Resolver that always fails.
    pub struct FailingDescriptorResolver;

    impl DescriptorResolver for FailingDescriptorResolver {
        fn build_descriptor(
            &self,
            controller: &dyn Controller,
        ) -> Result<Arc<ControllerMetaDescriptor>, MonoRailError> {
            Err(MonoRailError::DescriptorResolution {
                controller: controller.type_name().to_string(),
                reason: "introspection failed".to_string(),
            })
        }
    }

    /// Context factory delegating to the default one and recording its
    /// arguments.
    #[derive(Default)]
    pub struct RecordingContextFactory {
        pub created: Mutex<Vec<(String, String, String)>>,
    }

    impl ControllerContextFactory for RecordingContextFactory {
        fn create(
            &self,
            area: &str,
            controller_name: &str,
            action_name: &str,
            descriptor: Arc<ControllerMetaDescriptor>,
            route_match: Arc<RouteMatch>,
        ) -> Result<ControllerContext, MonoRailError> {
            self.created.lock().unwrap().push((
                area.to_string(),
                controller_name.to_string(),
                action_name.to_string(),
            ));
            DefaultControllerContextFactory.create(
                area,
                controller_name,
                action_name,
                descriptor,
                route_match,
            )
        }
    }

    pub fn descriptor(
        name: &str,
        sessionless: bool,
        actions: Vec<ActionDescriptor>,
    ) -> ControllerMetaDescriptor {
        ControllerMetaDescriptor::with_actions(
            ControllerDescriptor::new("tests::Stub", name, "", sessionless),
            actions,
        )
    }

    /// Request whose route match carries controller and action (and area when
    /// non-empty).
    pub fn routed_request(area: &str, controller: &str, action: &str) -> RequestContext {
        let mut request = RequestContext::new(Method::GET, format!("/{controller}/{action}"));
        let mut route_match = RouteMatch::new()
            .with_param("controller", controller)
            .with_param("action", action);
        if !area.is_empty() {
            route_match = route_match.with_param("area", area);
        }
        request.set_route_match(route_match);
        request
    }
}

pub mod views {
    use std::fs;
    use std::path::Path;

    /// Write `files` (relative path, contents) under `root`.
    pub fn write_views(root: &Path, files: &[(&str, &str)]) {
        for (path, contents) in files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, contents).unwrap();
        }
    }
}
