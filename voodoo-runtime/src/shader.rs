use crate::error::LinkFailure;
use crate::interface::{GraphicsAdapter, PassPrograms};
use crate::parameter::ParameterRef;
use crate::texture::Texture;
use log::trace;
use std::fmt;
use std::rc::Rc;
use voodoo_common::ProgramHandle;

const LOG_TARGET: &str = "voodoo::core";

/// The index of a technique within its shader.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TechniqueId(pub(crate) usize);

/// The index of a pass within its shader.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PassId(pub(crate) usize);

/// Whether a pass's programs were loaded by the adapter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PassStatus {
    Loaded,
    Failed(LinkFailure),
}

#[derive(Debug)]
pub(crate) struct Technique {
    pub(crate) name: String,
    pub(crate) target: Option<Rc<Texture>>,
    pub(crate) passes: Vec<PassId>,
}

#[derive(Debug)]
pub(crate) struct Pass {
    pub(crate) name: String,
    pub(crate) target: Option<Rc<Texture>>,
    pub(crate) technique: TechniqueId,
    pub(crate) programs: PassPrograms,
    pub(crate) status: PassStatus,
}

/// Programs loaded for a shader, unloaded through the adapter when dropped.
pub(crate) struct LoadedPrograms {
    pub(crate) adapter: Rc<dyn GraphicsAdapter>,
    pub(crate) programs: Vec<ProgramHandle>,
}

impl LoadedPrograms {
    pub(crate) fn new(adapter: Rc<dyn GraphicsAdapter>) -> Self {
        LoadedPrograms {
            adapter,
            programs: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, programs: PassPrograms) {
        self.programs
            .extend([programs.vertex, programs.fragment].into_iter().flatten());
    }
}

impl fmt::Debug for LoadedPrograms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPrograms")
            .field("programs", &self.programs)
            .finish_non_exhaustive()
    }
}

impl Drop for LoadedPrograms {
    fn drop(&mut self) {
        for program in self.programs.drain(..) {
            trace!(target: LOG_TARGET, "unloading program {}", program.raw());
            self.adapter.unload_program(program);
        }
    }
}

/// A linked shader.
///
/// The shader owns its techniques, passes and effect parameters. Techniques and passes
/// are stored flat and refer back to their owners by index, so navigating the graph
/// goes through the [`TechniqueRef`] and [`PassRef`] views.
///
/// Dropping the shader unloads the programs its passes loaded.
#[derive(Debug)]
pub struct Shader {
    pub(crate) name: String,
    pub(crate) techniques: Vec<Technique>,
    pub(crate) passes: Vec<Pass>,
    pub(crate) parameters: Vec<ParameterRef>,
    pub(crate) default_technique: Option<TechniqueId>,
    pub(crate) loaded: LoadedPrograms,
}

impl Shader {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated techniques, in declaration order.
    pub fn techniques(&self) -> impl Iterator<Item = TechniqueRef<'_>> + '_ {
        (0..self.techniques.len()).map(move |index| TechniqueRef {
            shader: self,
            id: TechniqueId(index),
        })
    }

    pub fn technique_count(&self) -> usize {
        self.techniques.len()
    }

    pub fn technique(&self, id: TechniqueId) -> Option<TechniqueRef<'_>> {
        (id.0 < self.techniques.len()).then_some(TechniqueRef { shader: self, id })
    }

    pub fn technique_by_name(&self, name: &str) -> Option<TechniqueRef<'_>> {
        self.techniques().find(|technique| technique.name() == name)
    }

    /// The first technique that validated, if any did.
    pub fn default_technique(&self) -> Option<TechniqueRef<'_>> {
        self.default_technique.and_then(|id| self.technique(id))
    }

    pub fn pass(&self, id: PassId) -> Option<PassRef<'_>> {
        (id.0 < self.passes.len()).then_some(PassRef { shader: self, id })
    }

    /// The effect parameters, in declaration order.
    pub fn parameters(&self) -> &[ParameterRef] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterRef> {
        self.parameters.iter().find(|parameter| parameter.name() == name)
    }
}

/// A view of a technique within its shader.
#[derive(Copy, Clone, Debug)]
pub struct TechniqueRef<'a> {
    shader: &'a Shader,
    id: TechniqueId,
}

impl<'a> TechniqueRef<'a> {
    fn technique(&self) -> &'a Technique {
        &self.shader.techniques[self.id.0]
    }

    pub fn id(&self) -> TechniqueId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.technique().name
    }

    /// The render target, or `None` to draw to the default target.
    pub fn target(&self) -> Option<&'a Rc<Texture>> {
        self.technique().target.as_ref()
    }

    /// The shader this technique belongs to.
    pub fn shader(&self) -> &'a Shader {
        self.shader
    }

    /// The passes of this technique, in declaration order.
    pub fn passes(&self) -> impl Iterator<Item = PassRef<'a>> + 'a {
        let shader = self.shader;
        self.technique()
            .passes
            .iter()
            .map(move |&id| PassRef { shader, id })
    }

    pub fn pass_count(&self) -> usize {
        self.technique().passes.len()
    }
}

impl PartialEq for TechniqueRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.shader, other.shader) && self.id == other.id
    }
}

/// A view of a pass within its shader.
#[derive(Copy, Clone, Debug)]
pub struct PassRef<'a> {
    shader: &'a Shader,
    id: PassId,
}

impl<'a> PassRef<'a> {
    fn pass(&self) -> &'a Pass {
        &self.shader.passes[self.id.0]
    }

    pub fn id(&self) -> PassId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.pass().name
    }

    /// The render target, or `None` to draw to the default target.
    pub fn target(&self) -> Option<&'a Rc<Texture>> {
        self.pass().target.as_ref()
    }

    /// The technique this pass belongs to.
    pub fn technique(&self) -> TechniqueRef<'a> {
        TechniqueRef {
            shader: self.shader,
            id: self.pass().technique,
        }
    }

    pub fn programs(&self) -> PassPrograms {
        self.pass().programs
    }

    pub fn status(&self) -> PassStatus {
        self.pass().status
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == PassStatus::Loaded
    }
}

impl PartialEq for PassRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.shader, other.shader) && self.id == other.id
    }
}
