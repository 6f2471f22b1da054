use crate::parameter::Parameter;
use voodoo_common::{DeclaredType, NativeHandle, ProgramHandle, TextureDesc};

/// A parameter as declared in a compiled effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    pub name: String,
    pub declared_type: DeclaredType,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        ParameterDecl {
            name: name.into(),
            declared_type,
        }
    }
}

/// The programs a pass draws with.
///
/// Either stage may be absent, in which case the adapter's fixed pipeline is used.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PassPrograms {
    pub vertex: Option<ProgramHandle>,
    pub fragment: Option<ProgramHandle>,
}

/// A node of a compiled effect that can carry annotations.
pub enum EffectNode<'a, C: EffectCompiler + ?Sized> {
    /// The parameter at the given declaration index.
    Parameter(&'a C::Effect, usize),
    Technique(&'a C::Technique),
    Pass(&'a C::Pass),
}

/// The effect compiler that produces compiled effects from source.
///
/// Techniques, passes and parameters are always reported in the order they were
/// declared in source.
pub trait EffectCompiler {
    /// A compiled effect.
    type Effect;
    /// A technique within a compiled effect.
    type Technique;
    /// A pass within a technique.
    type Pass;

    /// Whether the handle refers to a structurally valid compiled effect.
    fn is_valid_effect(&self, effect: &Self::Effect) -> bool;

    fn parameters(&self, effect: &Self::Effect) -> Vec<ParameterDecl>;

    fn techniques(&self, effect: &Self::Effect) -> Vec<Self::Technique>;

    fn technique_name(&self, technique: &Self::Technique) -> String;

    /// Whether the technique can run on the current hardware and profile.
    fn validate_technique(&self, technique: &Self::Technique) -> bool;

    fn passes(&self, technique: &Self::Technique) -> Vec<Self::Pass>;

    fn pass_name(&self, pass: &Self::Pass) -> String;

    /// Read a string annotation from a node.
    fn annotation(&self, node: EffectNode<'_, Self>, key: &str) -> Option<String>;

    fn programs(&self, pass: &Self::Pass) -> PassPrograms;
}

/// The graphics API adapter that owns native resources.
pub trait GraphicsAdapter {
    /// Load a program for drawing. Returns whether the program could be loaded.
    fn load_program(&self, program: ProgramHandle) -> bool;

    /// Unload a previously loaded program.
    fn unload_program(&self, program: ProgramHandle) -> bool;

    /// Bind a texture to an effect sampler, or unbind it when `texture` is `None`.
    fn push_sampler_binding(&self, parameter: &Parameter, texture: Option<NativeHandle>);

    /// Create a native texture. Returns `None` if the texture could not be created.
    fn create_texture(&self, name: &str, desc: &TextureDesc) -> Option<NativeHandle>;
}
