#![allow(dead_code)]

use std::cell::RefCell;
use voodoo::common::{DeclaredType, NativeHandle, ProgramHandle, TextureDesc};
use voodoo::runtime::{
    Core, EffectCompiler, EffectNode, GraphicsAdapter, Parameter, ParameterDecl, PassPrograms,
};

type Annotations = Vec<(String, String)>;

fn find(annotations: &Annotations, key: &str) -> Option<String> {
    annotations
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

#[derive(Clone, Default)]
pub struct Pass {
    pub name: String,
    pub programs: PassPrograms,
    pub annotations: Annotations,
}

impl Pass {
    pub fn new(name: &str, vertex: u64, fragment: u64) -> Self {
        Pass {
            name: name.to_string(),
            programs: PassPrograms {
                vertex: Some(ProgramHandle::new(vertex)),
                fragment: Some(ProgramHandle::new(fragment)),
            },
            annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, key: &str, value: &str) -> Self {
        self.annotations.push((key.to_string(), value.to_string()));
        self
    }
}

#[derive(Clone, Default)]
pub struct Technique {
    pub name: String,
    pub valid: bool,
    pub passes: Vec<Pass>,
    pub annotations: Annotations,
}

impl Technique {
    pub fn new(name: &str, passes: Vec<Pass>) -> Self {
        Technique {
            name: name.to_string(),
            valid: true,
            passes,
            annotations: Vec::new(),
        }
    }

    pub fn invalid(name: &str) -> Self {
        Technique {
            valid: false,
            ..Technique::new(name, vec![Pass::new("p0", 1, 2)])
        }
    }

    pub fn annotate(mut self, key: &str, value: &str) -> Self {
        self.annotations.push((key.to_string(), value.to_string()));
        self
    }
}

/// An in-memory compiled effect.
#[derive(Clone, Default)]
pub struct Effect {
    pub valid: bool,
    pub parameters: Vec<(ParameterDecl, Annotations)>,
    pub techniques: Vec<Technique>,
}

impl Effect {
    pub fn new(techniques: Vec<Technique>) -> Self {
        Effect {
            valid: true,
            parameters: Vec::new(),
            techniques,
        }
    }

    pub fn parameter(mut self, name: &str, ty: DeclaredType, annotations: &[(&str, &str)]) -> Self {
        let annotations = annotations
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.parameters.push((ParameterDecl::new(name, ty), annotations));
        self
    }
}

pub struct MockCompiler;

impl EffectCompiler for MockCompiler {
    type Effect = Effect;
    type Technique = Technique;
    type Pass = Pass;

    fn is_valid_effect(&self, effect: &Effect) -> bool {
        effect.valid
    }

    fn parameters(&self, effect: &Effect) -> Vec<ParameterDecl> {
        effect.parameters.iter().map(|(decl, _)| decl.clone()).collect()
    }

    fn techniques(&self, effect: &Effect) -> Vec<Technique> {
        effect.techniques.clone()
    }

    fn technique_name(&self, technique: &Technique) -> String {
        technique.name.clone()
    }

    fn validate_technique(&self, technique: &Technique) -> bool {
        technique.valid
    }

    fn passes(&self, technique: &Technique) -> Vec<Pass> {
        technique.passes.clone()
    }

    fn pass_name(&self, pass: &Pass) -> String {
        pass.name.clone()
    }

    fn annotation(&self, node: EffectNode<'_, Self>, key: &str) -> Option<String> {
        match node {
            EffectNode::Parameter(effect, slot) => find(&effect.parameters[slot].1, key),
            EffectNode::Technique(technique) => find(&technique.annotations, key),
            EffectNode::Pass(pass) => find(&pass.annotations, key),
        }
    }

    fn programs(&self, pass: &Pass) -> PassPrograms {
        pass.programs
    }
}

/// An adapter that records every call made to it.
#[derive(Default)]
pub struct RecordingAdapter {
    pub failing: Vec<ProgramHandle>,
    pub loaded: RefCell<Vec<ProgramHandle>>,
    pub unloaded: RefCell<Vec<ProgramHandle>>,
    pub bindings: RefCell<Vec<(String, Option<NativeHandle>)>>,
    pub created: RefCell<Vec<String>>,
}

impl GraphicsAdapter for RecordingAdapter {
    fn load_program(&self, program: ProgramHandle) -> bool {
        if self.failing.contains(&program) {
            return false;
        }
        self.loaded.borrow_mut().push(program);
        true
    }

    fn unload_program(&self, program: ProgramHandle) -> bool {
        self.unloaded.borrow_mut().push(program);
        true
    }

    fn push_sampler_binding(&self, parameter: &Parameter, texture: Option<NativeHandle>) {
        self.bindings
            .borrow_mut()
            .push((parameter.name().to_string(), texture));
    }

    fn create_texture(&self, name: &str, _desc: &TextureDesc) -> Option<NativeHandle> {
        let mut created = self.created.borrow_mut();
        created.push(name.to_string());
        Some(NativeHandle::new(created.len() as u64))
    }
}

pub type MockCore = Core<MockCompiler, RecordingAdapter>;

pub fn core() -> MockCore {
    Core::new(MockCompiler, RecordingAdapter::default(), None).unwrap()
}
