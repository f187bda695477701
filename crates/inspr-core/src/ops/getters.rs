//! Read-only seams over a tree
//!
//! Consumers that only read (the deployment converter, CLI printers) take
//! `&impl AppGetter` and friends, so the same code runs against a
//! committed snapshot or an in-flight transaction.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::model::{Alias, App, Channel, ChannelType};

use super::boundary::{resolve_boundary, resolve_channels, ResolvedChannel};
use super::lookup;

/// Anything exposing a root dApp
pub trait TreeReader {
    fn tree(&self) -> &App;
}

pub trait AppGetter: TreeReader {
    /// # Errors
    ///
    /// `AppNotFound` when the path does not resolve.
    fn get_app(&self, query: &str) -> Result<&App> {
        lookup::find_app(self.tree(), query)
    }

    /// # Errors
    ///
    /// `BoundaryUnresolved` when an entry does not reach a channel.
    fn resolve_boundary(&self, app: &App) -> Result<BTreeMap<String, String>> {
        resolve_boundary(self.tree(), app)
    }

    /// # Errors
    ///
    /// `BoundaryUnresolved` when an entry does not reach a channel.
    fn resolve_channels(&self, app: &App) -> Result<BTreeMap<String, ResolvedChannel>> {
        resolve_channels(self.tree(), app)
    }
}

pub trait ChannelGetter: TreeReader {
    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    fn get_channel(&self, scope: &str, name: &str) -> Result<&Channel> {
        lookup::find_channel(self.tree(), scope, name)
    }
}

pub trait TypeGetter: TreeReader {
    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    fn get_type(&self, scope: &str, name: &str) -> Result<&ChannelType> {
        lookup::find_type(self.tree(), scope, name)
    }
}

pub trait AliasGetter: TreeReader {
    /// `scope` is the dApp holding the alias; `key` is `<child>.<boundary>`
    ///
    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    fn get_alias(&self, scope: &str, key: &str) -> Result<&Alias> {
        lookup::find_alias(self.tree(), scope, key)
    }
}

impl<T: TreeReader + ?Sized> AppGetter for T {}
impl<T: TreeReader + ?Sized> ChannelGetter for T {}
impl<T: TreeReader + ?Sized> TypeGetter for T {}
impl<T: TreeReader + ?Sized> AliasGetter for T {}

impl TreeReader for App {
    fn tree(&self) -> &App {
        self
    }
}
