use crate::registry::RegistryEntry;
use crate::texture::Texture;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use voodoo_common::{DeclaredType, ParameterCategory};

/// The maximum number of scalar components a parameter holds.
pub const MAX_COMPONENTS: usize = 16;

/// A shared handle to a parameter.
pub type ParameterRef = Rc<Parameter>;

/// The current value of a parameter.
#[derive(Debug, Clone)]
pub enum ParameterValue {
    Float([f32; MAX_COMPONENTS]),
    Sampler(Option<Rc<Texture>>),
    Struct,
}

impl ParameterValue {
    fn empty(category: ParameterCategory) -> Self {
        match category {
            ParameterCategory::Float => ParameterValue::Float([0.0; MAX_COMPONENTS]),
            ParameterCategory::Sampler => ParameterValue::Sampler(None),
            ParameterCategory::Struct => ParameterValue::Struct,
        }
    }
}

/// A named shader parameter.
///
/// Virtual parameters belong to the core and are not bound to any effect. Effect
/// parameters are produced when a shader is linked and refer to the declaration slot
/// they were created from.
///
/// A parameter may be attached to one source parameter, whose value it then mirrors.
/// Attachment edges never keep either side alive.
#[derive(Debug)]
pub struct Parameter {
    name: String,
    declared_type: DeclaredType,
    slot: Option<usize>,
    pub(crate) value: RefCell<ParameterValue>,
    pub(crate) source: RefCell<Weak<Parameter>>,
    pub(crate) attached: RefCell<Vec<Weak<Parameter>>>,
}

impl Parameter {
    fn new(name: String, declared_type: DeclaredType, slot: Option<usize>) -> Self {
        Parameter {
            name,
            declared_type,
            slot,
            value: RefCell::new(ParameterValue::empty(declared_type.category())),
            source: RefCell::new(Weak::new()),
            attached: RefCell::new(Vec::new()),
        }
    }

    /// Create a core-level parameter that is not bound to an effect.
    pub fn new_virtual(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self::new(name.into(), declared_type, None)
    }

    pub(crate) fn new_effect(name: String, declared_type: DeclaredType, slot: usize) -> Self {
        Self::new(name, declared_type, Some(slot))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    pub fn category(&self) -> ParameterCategory {
        self.declared_type.category()
    }

    pub fn is_virtual(&self) -> bool {
        self.slot.is_none()
    }

    /// The declaration index within the linked effect, for effect parameters.
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// A copy of the current value.
    pub fn value(&self) -> ParameterValue {
        self.value.borrow().clone()
    }

    /// The scalar components, if this is a float parameter.
    pub fn scalars(&self) -> Option<[f32; MAX_COMPONENTS]> {
        match &*self.value.borrow() {
            ParameterValue::Float(values) => Some(*values),
            _ => None,
        }
    }

    /// The bound texture, if this is a sampler parameter with a texture bound.
    pub fn texture(&self) -> Option<Rc<Texture>> {
        match &*self.value.borrow() {
            ParameterValue::Sampler(texture) => texture.clone(),
            _ => None,
        }
    }

    /// The parameter this one mirrors, if it is attached and the source is alive.
    pub fn attached_to(&self) -> Option<ParameterRef> {
        self.source.borrow().upgrade()
    }

    /// The live parameters attached directly to this one.
    pub fn attached(&self) -> Vec<ParameterRef> {
        self.attached
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl RegistryEntry for Parameter {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn values_start_empty() {
        let float = Parameter::new_virtual("time", DeclaredType::Float);
        assert!(float.is_virtual());
        assert_eq!(Some([0.0; MAX_COMPONENTS]), float.scalars());
        assert!(float.texture().is_none());

        let sampler = Parameter::new_effect("scene".into(), DeclaredType::Sampler2D, 3);
        assert!(!sampler.is_virtual());
        assert_eq!(Some(3), sampler.slot());
        assert_eq!(None, sampler.scalars());
        assert!(matches!(sampler.value(), ParameterValue::Sampler(None)));
    }
}
