use crate::binder::ParameterBinder;
use crate::error::{LinkError, LinkFailure};
use crate::interface::{EffectCompiler, EffectNode, GraphicsAdapter, PassPrograms};
use crate::parameter::{Parameter, ParameterRef};
use crate::registry::{ParameterRegistry, StageTextureRegistry, TextureRegistry};
use crate::shader::{LoadedPrograms, Pass, PassId, PassStatus, Shader, Technique, TechniqueId};
use crate::texture::Texture;
use log::{debug, info, warn};
use std::rc::Rc;
use voodoo_common::{ParameterCategory, TextureStage};
use voodoo_parser::{ParseFlags, VariableParser};

const LOG_TARGET: &str = "voodoo::linker";

/// Names the texture a technique or pass renders into.
pub const TARGET_ANNOTATION: &str = "target";
/// Names a texture bound to a sampler parameter when it is linked.
pub const TEXTURE_ANNOTATION: &str = "texture";
/// Names a virtual parameter that a linked parameter is attached to.
pub const SOURCE_ANNOTATION: &str = "source";

/// The resources a link resolves names against.
#[derive(Copy, Clone)]
pub struct LinkContext<'a> {
    pub parser: &'a VariableParser,
    pub textures: &'a TextureRegistry,
    pub parameters: &'a ParameterRegistry,
    pub stages: &'a StageTextureRegistry,
}

/// Builds linked shaders from compiled effects.
///
/// Linked shaders share the adapter so they can unload their programs when dropped.
pub struct ShaderLinker<'a, C: EffectCompiler + ?Sized, A: GraphicsAdapter + 'static> {
    compiler: &'a C,
    adapter: Rc<A>,
}

impl<'a, C: EffectCompiler + ?Sized, A: GraphicsAdapter + 'static> ShaderLinker<'a, C, A> {
    pub fn new(compiler: &'a C, adapter: Rc<A>) -> Self {
        ShaderLinker { compiler, adapter }
    }

    /// Link a compiled effect into a shader.
    ///
    /// Techniques that fail validation are skipped, and passes whose programs can not
    /// be loaded are kept with a [`PassStatus::Failed`] status. The only hard failure
    /// is an effect that is not structurally valid.
    pub fn link(
        &self,
        name: &str,
        effect: &C::Effect,
        context: LinkContext<'_>,
    ) -> Result<Shader, LinkError> {
        let name = context.parser.parse(name, ParseFlags::NONE);
        if !self.compiler.is_valid_effect(effect) {
            return Err(LinkError::InvalidCompiledUnit(name));
        }

        debug!(target: LOG_TARGET, "linking {name}");
        let parameters = self.link_parameters(effect, context);

        let mut techniques = Vec::new();
        let mut passes = Vec::new();
        let mut loaded = LoadedPrograms::new(self.adapter.clone());
        for technique in self.compiler.techniques(effect) {
            let technique_name = self.compiler.technique_name(&technique);
            if !self.compiler.validate_technique(&technique) {
                warn!(
                    target: LOG_TARGET,
                    "technique {technique_name} in {name} failed validation"
                );
                continue;
            }

            let id = TechniqueId(techniques.len());
            let target = self.resolve_target(
                EffectNode::Technique(&technique),
                context,
                TextureStage::ShaderDefault,
            );

            let mut technique_passes = Vec::new();
            for pass in self.compiler.passes(&technique) {
                let pass_name = self.compiler.pass_name(&pass);
                let target = self.resolve_target(
                    EffectNode::Pass(&pass),
                    context,
                    TextureStage::PassDefault,
                );
                let programs = self.compiler.programs(&pass);
                let status = self.load_programs(programs);
                match status {
                    PassStatus::Loaded => loaded.push(programs),
                    PassStatus::Failed(failure) => {
                        warn!(target: LOG_TARGET, "pass {pass_name} of {technique_name}: {failure}")
                    }
                }

                technique_passes.push(PassId(passes.len()));
                passes.push(Pass {
                    name: pass_name,
                    target,
                    technique: id,
                    programs,
                    status,
                });
            }

            debug!(
                target: LOG_TARGET,
                "technique {technique_name} has {} passes",
                technique_passes.len()
            );
            techniques.push(Technique {
                name: technique_name,
                target,
                passes: technique_passes,
            });
        }

        let default_technique = (!techniques.is_empty()).then_some(TechniqueId(0));
        if default_technique.is_none() {
            warn!(target: LOG_TARGET, "no valid techniques in {name}");
        }

        info!(
            target: LOG_TARGET,
            "linked {name} with {} techniques and {} parameters",
            techniques.len(),
            parameters.len()
        );

        Ok(Shader {
            name,
            techniques,
            passes,
            parameters,
            default_technique,
            loaded,
        })
    }

    fn link_parameters(&self, effect: &C::Effect, context: LinkContext<'_>) -> Vec<ParameterRef> {
        let binder = ParameterBinder::new(&*self.adapter);
        let mut parameters = Vec::new();

        for (slot, decl) in self.compiler.parameters(effect).into_iter().enumerate() {
            let parameter = Rc::new(Parameter::new_effect(decl.name, decl.declared_type, slot));

            let node = || EffectNode::Parameter(effect, slot);

            if let Some(texture) = self.annotated_texture(node(), TEXTURE_ANNOTATION, context) {
                if let Err(e) = binder.set_sampler(&parameter, Some(&texture)) {
                    warn!(target: LOG_TARGET, "can not bind {}: {e}", parameter.name());
                }
            }

            if let Some(source) = self.compiler.annotation(node(), SOURCE_ANNOTATION) {
                let source = context.parser.parse(&source, ParseFlags::NONE);
                match context.parameters.get(&source) {
                    Some(source) => {
                        if let Err(e) = binder.attach(&source, &parameter) {
                            warn!(target: LOG_TARGET, "can not attach {}: {e}", parameter.name());
                        }
                    }
                    None => warn!(
                        target: LOG_TARGET,
                        "source parameter {source} for {} is not registered",
                        parameter.name()
                    ),
                }
            }

            if parameter.category() == ParameterCategory::Struct {
                debug!(target: LOG_TARGET, "struct parameter {} is not bindable", parameter.name());
            }
            parameters.push(parameter);
        }

        parameters
    }

    /// Look up the registered texture named by an annotation.
    fn annotated_texture(
        &self,
        node: EffectNode<'_, C>,
        key: &str,
        context: LinkContext<'_>,
    ) -> Option<Rc<Texture>> {
        let name = self.compiler.annotation(node, key)?;
        let name = context.parser.parse(&name, ParseFlags::NONE);
        let texture = context.textures.get(&name);
        if texture.is_none() {
            warn!(target: LOG_TARGET, "{key} texture {name} is not registered");
        }
        texture
    }

    fn resolve_target(
        &self,
        node: EffectNode<'_, C>,
        context: LinkContext<'_>,
        fallback: TextureStage,
    ) -> Option<Rc<Texture>> {
        self.annotated_texture(node, TARGET_ANNOTATION, context)
            .or_else(|| context.stages.get(fallback))
    }

    fn load_programs(&self, programs: PassPrograms) -> PassStatus {
        if let Some(vertex) = programs.vertex {
            if !self.adapter.load_program(vertex) {
                return PassStatus::Failed(LinkFailure::VertexProgram);
            }
        }

        if let Some(fragment) = programs.fragment {
            if !self.adapter.load_program(fragment) {
                if let Some(vertex) = programs.vertex {
                    self.adapter.unload_program(vertex);
                }
                return PassStatus::Failed(LinkFailure::FragmentProgram);
            }
        }

        PassStatus::Loaded
    }
}
