use crate::error::RegistryError;
use crate::parameter::Parameter;
use crate::texture::Texture;
use log::debug;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use voodoo_common::TextureStage;

const LOG_TARGET: &str = "voodoo::core";

/// An entity that is registered under its own name.
pub trait RegistryEntry {
    fn name(&self) -> &str;
}

/// A name-keyed store of reference-counted entries.
///
/// Names are unique. Inserting a name that is already present fails and leaves the
/// existing entry untouched. An entry lives until it is removed and every handle
/// returned from the registry is dropped.
#[derive(Debug)]
pub struct Registry<T> {
    entries: FxHashMap<String, Rc<T>>,
}

pub type TextureRegistry = Registry<Texture>;
pub type ParameterRegistry = Registry<Parameter>;

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            entries: FxHashMap::default(),
        }
    }
}

impl<T: RegistryEntry> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry under its name, returning a handle to it.
    pub fn insert(&mut self, entry: impl Into<Rc<T>>) -> Result<Rc<T>, RegistryError> {
        let entry = entry.into();
        let name = entry.name();
        if self.entries.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        debug!(target: LOG_TARGET, "registered {name}");
        self.entries.insert(name.to_string(), Rc::clone(&entry));
        Ok(entry)
    }

    pub fn get(&self, name: &str) -> Option<Rc<T>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove an entry. Removing a name that is not registered is not an error.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.entries.remove(name).is_some();
        if removed {
            debug!(target: LOG_TARGET, "removed {name}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<T>> {
        self.entries.values()
    }
}

/// Fallback render targets for each texture stage.
#[derive(Debug, Default)]
pub struct StageTextureRegistry {
    stages: [Option<Rc<Texture>>; TextureStage::COUNT],
}

impl StageTextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: TextureStage) -> Option<Rc<Texture>> {
        self.stages[stage as usize].clone()
    }

    /// Set or clear the texture for a stage, returning the previous one.
    pub fn set(&mut self, stage: TextureStage, texture: Option<Rc<Texture>>) -> Option<Rc<Texture>> {
        std::mem::replace(&mut self.stages[stage as usize], texture)
    }
}
