use crate::binder::ParameterBinder;
use crate::error::{CoreError, RegistryError, Result};
use crate::interface::{EffectCompiler, GraphicsAdapter};
use crate::linker::{LinkContext, ShaderLinker};
use crate::options::CoreOptions;
use crate::parameter::{Parameter, ParameterRef};
use crate::registry::{ParameterRegistry, StageTextureRegistry, TextureRegistry};
use crate::shader::Shader;
use crate::texture::Texture;
use log::{debug, info};
use std::rc::Rc;
use voodoo_common::{DeclaredType, TextureDesc, TextureStage};
use voodoo_parser::{ParseFlags, VariableParser, VariableType};

const LOG_TARGET: &str = "voodoo::core";

/// The context that owns the variable parser, the resource registries and the
/// collaborators used to compile and draw effects.
pub struct Core<C: EffectCompiler, A: GraphicsAdapter + 'static> {
    compiler: C,
    adapter: Rc<A>,
    parser: VariableParser,
    textures: TextureRegistry,
    parameters: ParameterRegistry,
    stages: StageTextureRegistry,
}

impl<C: EffectCompiler, A: GraphicsAdapter + 'static> Core<C, A> {
    /// Create a core, seeding system variables from the options and loading the
    /// variable file they name, if any.
    pub fn new(compiler: C, adapter: A, options: Option<&CoreOptions>) -> Result<Self> {
        let mut parser = VariableParser::new();

        if let Some(options) = options {
            for (name, value) in options.system_variables() {
                parser.add(name, value, VariableType::System);
            }

            if let Some(path) = &options.variables {
                let count = parser.load_variables(path, VariableType::User)?;
                debug!(target: LOG_TARGET, "loaded {count} variables from {}", path.display());
            }
        }

        info!(target: LOG_TARGET, "created core");
        Ok(Core {
            compiler,
            adapter: Rc::new(adapter),
            parser,
            textures: TextureRegistry::new(),
            parameters: ParameterRegistry::new(),
            stages: StageTextureRegistry::new(),
        })
    }

    pub fn parser(&self) -> &VariableParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut VariableParser {
        &mut self.parser
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }

    /// Resolve all variables in `input`.
    pub fn parse(&self, input: impl AsRef<str>, flags: ParseFlags) -> String {
        self.parser.parse(input, flags)
    }

    /// Create a texture through the adapter and register it.
    pub fn create_texture(&mut self, name: &str, desc: TextureDesc) -> Result<Rc<Texture>> {
        if name.is_empty() {
            return Err(CoreError::InvalidArgument("name"));
        }
        if self.textures.contains(name) {
            return Err(RegistryError::DuplicateName(name.to_string()).into());
        }

        let handle = self
            .adapter
            .create_texture(name, &desc)
            .ok_or_else(|| CoreError::TextureCreation(name.to_string()))?;

        debug!(
            target: LOG_TARGET,
            "created {}x{} {:?} texture {name}", desc.width, desc.height, desc.format
        );
        Ok(self.textures.insert(Texture::new(name, desc, handle))?)
    }

    pub fn get_texture(&self, name: &str) -> Option<Rc<Texture>> {
        self.textures.get(name)
    }

    /// Unregister a texture. Handles held elsewhere keep it alive.
    pub fn remove_texture(&mut self, name: &str) -> bool {
        self.textures.remove(name)
    }

    /// Create and register a virtual parameter.
    pub fn create_parameter(
        &mut self,
        name: &str,
        declared_type: DeclaredType,
    ) -> Result<ParameterRef> {
        if name.is_empty() {
            return Err(CoreError::InvalidArgument("name"));
        }

        Ok(self
            .parameters
            .insert(Parameter::new_virtual(name, declared_type))?)
    }

    pub fn get_parameter(&self, name: &str) -> Option<ParameterRef> {
        self.parameters.get(name)
    }

    pub fn remove_parameter(&mut self, name: &str) -> bool {
        self.parameters.remove(name)
    }

    /// Set or clear the fallback target for a stage, returning the previous one.
    pub fn set_stage_texture(
        &mut self,
        stage: TextureStage,
        texture: Option<Rc<Texture>>,
    ) -> Option<Rc<Texture>> {
        self.stages.set(stage, texture)
    }

    /// Set the fallback target for a stage to a registered texture.
    pub fn set_stage_texture_by_name(
        &mut self,
        stage: TextureStage,
        name: &str,
    ) -> Result<Option<Rc<Texture>>> {
        let texture = self
            .textures
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok(self.stages.set(stage, Some(texture)))
    }

    pub fn get_stage_texture(&self, stage: TextureStage) -> Option<Rc<Texture>> {
        self.stages.get(stage)
    }

    /// Link a compiled effect against the registered resources.
    pub fn link_shader(&self, name: &str, effect: &C::Effect) -> Result<Shader> {
        let linker = ShaderLinker::new(&self.compiler, Rc::clone(&self.adapter));
        Ok(linker.link(name, effect, self.link_context())?)
    }

    /// Unload every program a linked shader loaded.
    ///
    /// Dropping the shader has the same effect.
    pub fn unlink_shader(&self, shader: Shader) {
        debug!(target: LOG_TARGET, "unlinking {}", shader.name());
        drop(shader);
    }

    /// A binder that pushes sampler bindings through this core's adapter.
    pub fn binder(&self) -> ParameterBinder<'_, A> {
        ParameterBinder::new(&*self.adapter)
    }

    fn link_context(&self) -> LinkContext<'_> {
        LinkContext {
            parser: &self.parser,
            textures: &self.textures,
            parameters: &self.parameters,
            stages: &self.stages,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interface::{EffectNode, ParameterDecl, PassPrograms};
    use std::cell::RefCell;
    use voodoo_common::{NativeHandle, ProgramHandle, TextureFormat};

    struct NullCompiler;

    impl EffectCompiler for NullCompiler {
        type Effect = Vec<ParameterDecl>;
        type Technique = ();
        type Pass = ();

        fn is_valid_effect(&self, _effect: &Self::Effect) -> bool {
            true
        }

        fn parameters(&self, effect: &Self::Effect) -> Vec<ParameterDecl> {
            effect.clone()
        }

        fn techniques(&self, _effect: &Self::Effect) -> Vec<()> {
            vec![()]
        }

        fn technique_name(&self, _technique: &()) -> String {
            "main".to_string()
        }

        fn validate_technique(&self, _technique: &()) -> bool {
            true
        }

        fn passes(&self, _technique: &()) -> Vec<()> {
            vec![()]
        }

        fn pass_name(&self, _pass: &()) -> String {
            "p0".to_string()
        }

        fn annotation(&self, _node: EffectNode<'_, Self>, _key: &str) -> Option<String> {
            None
        }

        fn programs(&self, _pass: &()) -> PassPrograms {
            PassPrograms {
                vertex: Some(ProgramHandle::new(10)),
                fragment: Some(ProgramHandle::new(11)),
            }
        }
    }

    #[derive(Default)]
    struct CountingAdapter {
        created: RefCell<u64>,
        unloaded: RefCell<Vec<ProgramHandle>>,
    }

    impl GraphicsAdapter for CountingAdapter {
        fn load_program(&self, _program: ProgramHandle) -> bool {
            true
        }

        fn unload_program(&self, program: ProgramHandle) -> bool {
            self.unloaded.borrow_mut().push(program);
            true
        }

        fn push_sampler_binding(&self, _parameter: &Parameter, _texture: Option<NativeHandle>) {}

        fn create_texture(&self, _name: &str, desc: &TextureDesc) -> Option<NativeHandle> {
            if desc.format == TextureFormat::Unknown {
                return None;
            }
            *self.created.borrow_mut() += 1;
            Some(NativeHandle::new(*self.created.borrow()))
        }
    }

    fn new_core(options: Option<&CoreOptions>) -> Core<NullCompiler, CountingAdapter> {
        Core::new(NullCompiler, CountingAdapter::default(), options).unwrap()
    }

    #[test]
    fn seeds_system_variables() {
        let options = CoreOptions {
            local_root: Some("C:\\Game\\".to_string()),
            target: Some("game.exe".to_string()),
            ..Default::default()
        };
        let core = new_core(Some(&options));
        assert_eq!("game.exe", core.parse("$(target)", ParseFlags::NONE));
        assert_eq!("badvar:globalroot", core.parse("$(globalroot)", ParseFlags::NONE));
    }

    #[test]
    fn duplicate_texture_skips_adapter() {
        let mut core = new_core(None);
        let desc = TextureDesc::new(64, 64, TextureFormat::Rgba8);
        let first = core.create_texture("scene", desc).unwrap();
        assert!(matches!(
            core.create_texture("scene", desc),
            Err(CoreError::Registry(RegistryError::DuplicateName(_)))
        ));
        assert_eq!(1, *core.adapter().created.borrow());
        assert_eq!(Some(first), core.get_texture("scene"));

        assert!(matches!(
            core.create_texture("", desc),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            core.create_texture("bad", TextureDesc::default()),
            Err(CoreError::TextureCreation(_))
        ));
        assert!(core.get_texture("bad").is_none());
    }

    #[test]
    fn stage_texture_by_name() {
        let mut core = new_core(None);
        assert!(matches!(
            core.set_stage_texture_by_name(TextureStage::PassDefault, "missing"),
            Err(CoreError::Registry(RegistryError::NotFound(_)))
        ));

        let texture = core
            .create_texture("last", TextureDesc::new(8, 8, TextureFormat::Rgba8))
            .unwrap();
        assert!(core
            .set_stage_texture_by_name(TextureStage::PassDefault, "last")
            .unwrap()
            .is_none());
        assert_eq!(Some(texture), core.get_stage_texture(TextureStage::PassDefault));
    }

    #[test]
    fn unlink_unloads_programs() {
        let core = new_core(None);
        let shader = core
            .link_shader("test", &vec![ParameterDecl::new("a", DeclaredType::Float)])
            .unwrap();
        assert_eq!(1, shader.parameters().len());

        core.unlink_shader(shader);
        assert_eq!(
            vec![ProgramHandle::new(10), ProgramHandle::new(11)],
            *core.adapter().unloaded.borrow()
        );
    }
}
