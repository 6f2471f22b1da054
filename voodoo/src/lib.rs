#![forbid(missing_docs)]
//! Shader injection core.
//!
//! Voodoo overlays post-processing effects onto applications that render through
//! D3D8, D3D9 or OpenGL. This crate is the API-independent core: it resolves the
//! variable templates used for paths and names, keeps the registries of textures and
//! parameters an effect can refer to, and links compiled effects into a navigable
//! graph of techniques, passes and parameters.
//!
//! ## Usage
//! The central object is the [`Core`](crate::runtime::Core). A core is created from an
//! [`EffectCompiler`](crate::runtime::EffectCompiler), which reads compiled effects,
//! and a [`GraphicsAdapter`](crate::runtime::GraphicsAdapter), which owns the native
//! programs and textures of one graphics API.
//!
//! Textures and virtual parameters are created through the core. A compiled effect can
//! then be linked with `Core::link_shader`. Annotations on the effect name the textures
//! each technique and pass render into, and can attach effect parameters to virtual
//! ones so that a single write reaches every linked effect.
//!
//! | **Annotation** | **Applies to**     | **Meaning**                                  |
//! |----------------|--------------------|----------------------------------------------|
//! | `target`       | techniques, passes | registered texture to render into            |
//! | `texture`      | sampler parameters | registered texture bound when linked         |
//! | `source`       | parameters         | virtual parameter this one is attached to    |
//!
//! Annotation values are resolved through the variable parser before lookup.

/// Shared types for textures and parameters.
pub mod common {
    pub use voodoo_common::*;
}

#[cfg(feature = "parser")]
/// Variable resolution for paths and names.
///
/// Variables are written as `$(name)`. A variable can be assigned for the rest of a
/// single parse with `$(name:value)`, suppressed when missing with `$(?name)`, and
/// substituted without being parsed again with `$(!name)`.
pub mod parser {
    pub use voodoo_parser::*;
}

#[cfg(feature = "runtime")]
/// Resource registries, shader linking and parameter binding.
pub mod runtime {
    pub use voodoo_runtime::*;
}
