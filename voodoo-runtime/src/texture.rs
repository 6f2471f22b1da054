use crate::registry::RegistryEntry;
use voodoo_common::{NativeHandle, TextureDesc};

/// A named texture created by the graphics adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    name: String,
    desc: TextureDesc,
    handle: NativeHandle,
}

impl Texture {
    pub fn new(name: impl Into<String>, desc: TextureDesc, handle: NativeHandle) -> Self {
        Texture {
            name: name.into(),
            desc,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}

impl RegistryEntry for Texture {
    fn name(&self) -> &str {
        &self.name
    }
}
