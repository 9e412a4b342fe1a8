// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Engine module hosting.
//!
//! A [`Module`] is the unit the host loads at startup. It exports a set of
//! versioned interfaces by name; [`ModuleHost`] resolves and caches them and
//! hands out the loaded engine once both required interfaces are present.
//!
//! Interface names carry their version as a three digit suffix
//! (`basesystem002`). Asking for a version the module doesn't export, when it
//! exports another version of the same interface, is reported as
//! [`InterfaceError::VersionMismatch`].

pub mod builtin;

use std::collections::HashMap;

use crate::engine::{CommandSource, EngineApi, INTERFACE_DEDICATED_SERVER_API, INTERFACE_SYSTEM_BASE};
use crate::error::InterfaceError;

pub use builtin::{BuiltinModule, LocalEngine};

/// An engine that serves both the server API and the command registry.
pub trait HostedEngine: EngineApi + CommandSource {}

impl<T: EngineApi + CommandSource + ?Sized> HostedEngine for T {}

/// A loadable engine module.
pub trait Module {
    /// Module name used in diagnostics.
    fn name(&self) -> &str;

    /// Bring the module up. Returns false if it can't be loaded.
    fn load(&mut self) -> bool;

    fn unload(&mut self);

    /// Versioned names of the interfaces this module exports.
    fn exports(&self) -> &[&'static str];

    /// The loaded engine, if any.
    fn engine(&mut self) -> Option<&mut dyn HostedEngine>;
}

/// Owns a module and its interface cache.
pub struct ModuleHost<M: Module> {
    module: M,
    loaded: bool,
    interfaces: HashMap<String, &'static str>,
}

impl<M: Module> ModuleHost<M> {
    pub fn new(module: M) -> Self {
        Self {
            module,
            loaded: false,
            interfaces: HashMap::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Load the module. Does nothing if it is already loaded.
    pub fn load(&mut self) -> bool {
        if self.loaded {
            return true;
        }

        self.interfaces.clear();
        self.loaded = self.module.load();

        if self.loaded {
            tracing::info!("Loaded module '{}'", self.module.name());
        } else {
            tracing::warn!("Unable to load module '{}'", self.module.name());
        }

        self.loaded
    }

    pub fn unload(&mut self) {
        if !self.loaded {
            return;
        }

        self.module.unload();
        self.interfaces.clear();
        self.loaded = false;
        tracing::info!("Unloaded module '{}'", self.module.name());
    }

    /// Resolve an exported interface by its versioned name.
    pub fn interface(&mut self, name: &str) -> Result<&'static str, InterfaceError> {
        if !self.loaded {
            return Err(InterfaceError::NotLoaded {
                module: self.module.name().to_string(),
            });
        }

        if let Some(&cached) = self.interfaces.get(name) {
            return Ok(cached);
        }

        let exports = self.module.exports();

        if let Some(&exported) = exports.iter().find(|&&exported| exported == name) {
            self.interfaces.insert(name.to_string(), exported);
            return Ok(exported);
        }

        let (base, _) = split_version(name);
        let other_version = exports
            .iter()
            .find(|&&exported| split_version(exported).0 == base);

        Err(match other_version {
            Some(available) => InterfaceError::VersionMismatch {
                requested: name.to_string(),
                available: available.to_string(),
            },
            None => InterfaceError::NotFound { name: name.to_string() },
        })
    }

    /// Number of interfaces resolved since the module was loaded.
    pub fn cached_interfaces(&self) -> usize {
        self.interfaces.len()
    }

    /// The engine behind the server API and command registry interfaces.
    pub fn engine(&mut self) -> Result<&mut dyn HostedEngine, InterfaceError> {
        self.interface(INTERFACE_DEDICATED_SERVER_API)?;
        self.interface(INTERFACE_SYSTEM_BASE)?;

        let module = self.module.name().to_string();
        self.module.engine().ok_or(InterfaceError::NotLoaded { module })
    }

    pub fn module(&self) -> &M {
        &self.module
    }
}

impl<M: Module> Drop for ModuleHost<M> {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Split `name` into its base and three digit version suffix.
///
/// ```
/// use dedhost::module::split_version;
///
/// assert_eq!(split_version("basesystem002"), ("basesystem", Some(2)));
/// assert_eq!(split_version("console"), ("console", None));
/// ```
pub fn split_version(name: &str) -> (&str, Option<u32>) {
    if name.len() > 3 {
        let (base, suffix) = name.split_at(name.len() - 3);
        if suffix.bytes().all(|b| b.is_ascii_digit()) {
            return (base, suffix.parse().ok());
        }
    }
    (name, None)
}
