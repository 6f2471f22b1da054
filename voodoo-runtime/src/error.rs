use thiserror::Error;
use voodoo_common::ParameterCategory;
use voodoo_parser::ParseVariablesError;

/// Error type for registry operations.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RegistryError {
    #[error("an entry named {0} is already registered")]
    DuplicateName(String),
    #[error("no entry named {0} is registered")]
    NotFound(String),
}

/// Error type for linking a compiled effect.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum LinkError {
    #[error("the compiled effect for {0} is not valid")]
    InvalidCompiledUnit(String),
}

/// Why a pass could not load its programs.
///
/// This is recorded on the pass and never fails the link.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum LinkFailure {
    #[error("the vertex program failed to load")]
    VertexProgram,
    #[error("the fragment program failed to load")]
    FragmentProgram,
}

/// Error type for parameter binding.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindError {
    #[error("expected a {expected} parameter but got a {actual} parameter")]
    CategoryMismatch {
        expected: ParameterCategory,
        actual: ParameterCategory,
    },
    #[error("attaching the parameter would create a cycle")]
    AttachCycle,
    #[error("the argument was invalid")]
    InvalidArgument(&'static str),
}

/// Error type for the core context.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("the argument was empty or invalid")]
    InvalidArgument(&'static str),
    #[error("registry error")]
    Registry(#[from] RegistryError),
    #[error("shader link error")]
    Link(#[from] LinkError),
    #[error("parameter binding error")]
    Bind(#[from] BindError),
    #[error("the adapter could not create texture {0}")]
    TextureCreation(String),
    #[error("variable definition error")]
    Variables(#[from] ParseVariablesError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
