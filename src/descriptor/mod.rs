//! # Descriptor Module
//!
//! Controller metadata used by the dispatcher to pick a handler.
//!
//! A [`ControllerMetaDescriptor`] pairs the [`ControllerDescriptor`] (name, area,
//! sessionless flag) with a map from action name to [`ActionDescriptor`]. An
//! action is either a plain synchronous action or an [`AsyncActionPair`].
//!
//! Descriptors are produced by a [`DescriptorResolver`]. The default resolver
//! asks each controller to declare itself through
//! [`Controller::describe`](crate::controller::Controller::describe) and caches
//! the result per controller type:
//!
//! ```rust
//! use monorail::descriptor::DescriptorBuilder;
//!
//! let mut builder = DescriptorBuilder::new("app::HomeController");
//! builder.name("home").action("index").async_action("export");
//! let descriptor = builder.build().expect("well-formed");
//!
//! assert!(descriptor.action("export").is_some_and(|a| a.is_async()));
//! ```

mod resolver;
mod types;

pub use resolver::{DefaultDescriptorResolver, DescriptorResolver};
pub use types::{
    ActionDescriptor, ActionMap, AsyncActionPair, ControllerDescriptor, ControllerMetaDescriptor,
    DescriptorBuilder,
};
