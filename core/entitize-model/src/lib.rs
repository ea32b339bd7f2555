//! Entity graph model for Entitize.
//!
//! Turns plain deserialized JSON into typed entities that carry shared
//! behavior and relationship metadata, and projects them back to plain data
//! for the wire:
//! - [`Registry`] — type name to [`EntityTypeDescriptor`] and shared [`Behavior`]
//! - [`Registry::materialize`] — plain object to [`Entity`] graph
//! - [`Entity::dematerialize`] — entity graph to plain object with exactly the mapped keys
//! - [`Registry::extend`] — adds methods to every existing and future entity of a type
//!
//! Everything here is synchronous. Sending entities to a server lives in
//! `entitize-transport`.

mod behavior;
mod dematerialize;
mod entity;
mod error;
mod mapping;
mod materialize;
mod registry;

pub use behavior::{Behavior, BehaviorHandle, Method};
pub use entity::{Entity, FieldValue, ENTITY_TYPE_KEY};
pub use error::{EntitizeError, EntitizeResult};
pub use mapping::{EntityTypeDescriptor, FieldKind, FieldMapping, Relationship};
pub use registry::{Registry, RegistrySettings, TypeBundle};
