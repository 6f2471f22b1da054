//! Resource registries, shader linking and parameter binding for the Voodoo core.
//!
//! A [`Core`] owns the variable parser, the texture and parameter registries and the
//! two collaborators that do the API-specific work: an [`EffectCompiler`] that reads
//! compiled effects, and a [`GraphicsAdapter`] that loads programs and binds textures.
//!
//! Linking a compiled effect produces a [`Shader`], which owns its techniques, passes
//! and effect parameters. Parameters can be attached to each other with a
//! [`ParameterBinder`], after which writes to the source are mirrored into every
//! attached parameter.
//!
//! Everything here is single-threaded. Entities are shared with `Rc`, so none of the
//! types in this crate are `Send`.

mod binder;
mod core;
mod interface;
mod linker;
mod parameter;
mod registry;
mod shader;
mod texture;

pub mod error;
pub mod options;

pub use crate::core::Core;
pub use binder::ParameterBinder;
pub use interface::{EffectCompiler, EffectNode, GraphicsAdapter, ParameterDecl, PassPrograms};
pub use linker::{
    LinkContext, ShaderLinker, SOURCE_ANNOTATION, TARGET_ANNOTATION, TEXTURE_ANNOTATION,
};
pub use parameter::{Parameter, ParameterRef, ParameterValue, MAX_COMPONENTS};
pub use registry::{
    ParameterRegistry, Registry, RegistryEntry, StageTextureRegistry, TextureRegistry,
};
pub use shader::{PassId, PassRef, PassStatus, Shader, TechniqueId, TechniqueRef};
pub use texture::Texture;
