//! Shared types for the Voodoo shader core.
//!
//! This crate holds the closed sets of entity kinds used across the core: texture
//! formats and descriptors, declared parameter types and their categories, and the
//! fixed texture stages. Native handles are opaque to the core and only ever passed
//! back to the graphics adapter that produced them.

use std::fmt::{Display, Formatter};

#[repr(u32)]
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    #[default]
    Unknown = 0,

    /* packed */
    Rgb5,
    Rgb5A1,
    Rgb10A2,

    /* 8-bit */
    Rgb8,
    Rgba8,

    /* float */
    R16F,
    Rg16F,
    Rgba16F,
    R32F,
    Rg32F,
    Rgba32F,

    /* depth */
    D16,
    D32,
}

/// Creation parameters for a texture.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mipmaps: bool,
    pub render_target: bool,
    pub format: TextureFormat,
}

impl TextureDesc {
    /// A single-level 2D texture of the given size and format.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        TextureDesc {
            width,
            height,
            depth: 1,
            mipmaps: false,
            render_target: false,
            format,
        }
    }

    /// The same description, usable as a render target.
    pub fn render_target(self) -> Self {
        TextureDesc {
            render_target: true,
            ..self
        }
    }
}

/// A native resource handle owned by the graphics adapter.
///
/// The core never interprets the value.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NativeHandle(u64);

impl NativeHandle {
    pub const fn new(raw: u64) -> Self {
        NativeHandle(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// A compiled program handle owned by the effect compiler.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ProgramHandle(u64);

impl ProgramHandle {
    pub const fn new(raw: u64) -> Self {
        ProgramHandle(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// The type a parameter was declared with in effect source.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DeclaredType {
    Bool = 0,
    Int,
    Float,
    Float2,
    Float3,
    Float4,
    Float2x2,
    Float3x3,
    Float4x4,
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Struct,
}

impl DeclaredType {
    /// The binding category of this type.
    pub fn category(&self) -> ParameterCategory {
        match self {
            DeclaredType::Bool
            | DeclaredType::Int
            | DeclaredType::Float
            | DeclaredType::Float2
            | DeclaredType::Float3
            | DeclaredType::Float4
            | DeclaredType::Float2x2
            | DeclaredType::Float3x3
            | DeclaredType::Float4x4 => ParameterCategory::Float,
            DeclaredType::Sampler1D
            | DeclaredType::Sampler2D
            | DeclaredType::Sampler3D
            | DeclaredType::SamplerCube => ParameterCategory::Sampler,
            DeclaredType::Struct => ParameterCategory::Struct,
        }
    }

    /// Number of scalar components a value of this type holds.
    ///
    /// Samplers and structs have no scalar components.
    pub fn components(&self) -> usize {
        match self {
            DeclaredType::Bool | DeclaredType::Int | DeclaredType::Float => 1,
            DeclaredType::Float2 => 2,
            DeclaredType::Float3 => 3,
            DeclaredType::Float4 | DeclaredType::Float2x2 => 4,
            DeclaredType::Float3x3 => 9,
            DeclaredType::Float4x4 => 16,
            _ => 0,
        }
    }
}

impl Display for DeclaredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclaredType::Bool => f.write_str("bool"),
            DeclaredType::Int => f.write_str("int"),
            DeclaredType::Float => f.write_str("float"),
            DeclaredType::Float2 => f.write_str("float2"),
            DeclaredType::Float3 => f.write_str("float3"),
            DeclaredType::Float4 => f.write_str("float4"),
            DeclaredType::Float2x2 => f.write_str("float2x2"),
            DeclaredType::Float3x3 => f.write_str("float3x3"),
            DeclaredType::Float4x4 => f.write_str("float4x4"),
            DeclaredType::Sampler1D => f.write_str("sampler1D"),
            DeclaredType::Sampler2D => f.write_str("sampler2D"),
            DeclaredType::Sampler3D => f.write_str("sampler3D"),
            DeclaredType::SamplerCube => f.write_str("samplerCUBE"),
            DeclaredType::Struct => f.write_str("struct"),
        }
    }
}

/// How a parameter's value is stored and bound.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParameterCategory {
    Float = 0,
    Sampler,
    Struct,
}

impl Display for ParameterCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterCategory::Float => f.write_str("float"),
            ParameterCategory::Sampler => f.write_str("sampler"),
            ParameterCategory::Struct => f.write_str("struct"),
        }
    }
}

/// Pipeline stages with a fallback render target.
#[repr(usize)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureStage {
    /// Used by passes that declare no target of their own.
    PassDefault = 0,
    /// Used by techniques that declare no target of their own.
    ShaderDefault = 1,
}

impl TextureStage {
    pub const COUNT: usize = 2;
}
