use crate::error::BindError;
use crate::interface::GraphicsAdapter;
use crate::parameter::{Parameter, ParameterRef, ParameterValue, MAX_COMPONENTS};
use crate::texture::Texture;
use log::debug;
use std::rc::{Rc, Weak};
use voodoo_common::ParameterCategory;

const LOG_TARGET: &str = "voodoo::binder";

/// Typed writes to parameters and propagation along attachment edges.
///
/// Every write is mirrored into the parameters transitively attached to the written
/// one. Sampler values bound to effect parameters are pushed to the adapter.
pub struct ParameterBinder<'a, A: GraphicsAdapter + ?Sized> {
    adapter: &'a A,
}

impl<'a, A: GraphicsAdapter + ?Sized> ParameterBinder<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        ParameterBinder { adapter }
    }

    fn expect_category(parameter: &Parameter, expected: ParameterCategory) -> Result<(), BindError> {
        let actual = parameter.category();
        if actual != expected {
            return Err(BindError::CategoryMismatch { expected, actual });
        }
        Ok(())
    }

    /// Write at most as many scalar components as the declared type has, leaving the
    /// remaining components unchanged.
    pub fn set_scalar(&self, parameter: &Parameter, values: &[f32]) -> Result<(), BindError> {
        Self::expect_category(parameter, ParameterCategory::Float)?;
        if values.len() > parameter.declared_type().components() {
            return Err(BindError::InvalidArgument("values"));
        }

        if let ParameterValue::Float(components) = &mut *parameter.value.borrow_mut() {
            components[..values.len()].copy_from_slice(values);
        }

        self.propagate_if_attached(parameter);
        Ok(())
    }

    /// Bind a texture to a sampler parameter, or unbind it.
    pub fn set_sampler(
        &self,
        parameter: &Parameter,
        texture: Option<&Rc<Texture>>,
    ) -> Result<(), BindError> {
        Self::expect_category(parameter, ParameterCategory::Sampler)?;

        *parameter.value.borrow_mut() = ParameterValue::Sampler(texture.cloned());
        self.push_binding(parameter);

        self.propagate_if_attached(parameter);
        Ok(())
    }

    /// Read the scalar components of a float parameter.
    pub fn scalar(&self, parameter: &Parameter) -> Result<[f32; MAX_COMPONENTS], BindError> {
        Self::expect_category(parameter, ParameterCategory::Float)?;
        parameter
            .scalars()
            .ok_or(BindError::InvalidArgument("parameter"))
    }

    /// Read the texture bound to a sampler parameter.
    pub fn sampler(&self, parameter: &Parameter) -> Result<Option<Rc<Texture>>, BindError> {
        Self::expect_category(parameter, ParameterCategory::Sampler)?;
        Ok(parameter.texture())
    }

    /// Attach `target` to `source`, so that writes to `source` are mirrored into it.
    ///
    /// Both parameters must have the same category. A target has at most one source;
    /// attaching it again moves it to the new source. On success, the target takes
    /// the current value of the source.
    pub fn attach(&self, source: &ParameterRef, target: &ParameterRef) -> Result<(), BindError> {
        Self::expect_category(target, source.category())?;

        if Rc::ptr_eq(source, target) || Self::reaches(target, source) {
            return Err(BindError::AttachCycle);
        }

        self.detach(target);
        source.attached.borrow_mut().push(Rc::downgrade(target));
        *target.source.borrow_mut() = Rc::downgrade(source);
        debug!(target: LOG_TARGET, "attached {} to {}", target.name(), source.name());

        self.propagate_if_attached(source);
        Ok(())
    }

    /// Detach a parameter from its source. Returns whether it was attached.
    pub fn detach(&self, target: &ParameterRef) -> bool {
        let previous = std::mem::take(&mut *target.source.borrow_mut());
        let Some(previous) = previous.upgrade() else {
            return false;
        };

        previous
            .attached
            .borrow_mut()
            .retain(|attached| !Weak::ptr_eq(attached, &Rc::downgrade(target)));
        debug!(target: LOG_TARGET, "detached {} from {}", target.name(), previous.name());
        true
    }

    /// Mirror the value of `source` into every parameter transitively attached to it.
    pub fn propagate_if_attached(&self, source: &Parameter) {
        let mut pending = vec![(source.value(), Self::live_attached(source))];
        while let Some((value, targets)) = pending.pop() {
            for target in targets {
                *target.value.borrow_mut() = value.clone();
                if target.category() == ParameterCategory::Sampler {
                    self.push_binding(&target);
                }
                pending.push((value.clone(), Self::live_attached(&target)));
            }
        }
    }

    fn push_binding(&self, parameter: &Parameter) {
        if parameter.is_virtual() {
            return;
        }
        let handle = parameter.texture().map(|texture| texture.handle());
        self.adapter.push_sampler_binding(parameter, handle);
    }

    /// Prune dropped targets and return the live ones.
    fn live_attached(parameter: &Parameter) -> Vec<ParameterRef> {
        let mut attached = parameter.attached.borrow_mut();
        attached.retain(|target| target.strong_count() > 0);
        attached.iter().filter_map(Weak::upgrade).collect()
    }

    /// Whether `to` is reachable from `from` along attachment edges.
    fn reaches(from: &Parameter, to: &ParameterRef) -> bool {
        let mut pending = Self::live_attached(from);
        while let Some(next) = pending.pop() {
            if Rc::ptr_eq(&next, to) {
                return true;
            }
            pending.extend(Self::live_attached(&next));
        }
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interface::GraphicsAdapter;
    use std::cell::RefCell;
    use voodoo_common::{DeclaredType, NativeHandle, ProgramHandle, TextureDesc, TextureFormat};

    #[derive(Default)]
    struct RecordingAdapter {
        pushed: RefCell<Vec<(String, Option<NativeHandle>)>>,
    }

    impl GraphicsAdapter for RecordingAdapter {
        fn load_program(&self, _program: ProgramHandle) -> bool {
            true
        }

        fn unload_program(&self, _program: ProgramHandle) -> bool {
            true
        }

        fn push_sampler_binding(&self, parameter: &Parameter, texture: Option<NativeHandle>) {
            self.pushed
                .borrow_mut()
                .push((parameter.name().to_string(), texture));
        }

        fn create_texture(&self, _name: &str, _desc: &TextureDesc) -> Option<NativeHandle> {
            None
        }
    }

    fn texture(handle: u64) -> Rc<Texture> {
        Rc::new(Texture::new(
            "scene",
            TextureDesc::new(640, 480, TextureFormat::Rgba8),
            NativeHandle::new(handle),
        ))
    }

    fn float(name: &str) -> ParameterRef {
        Rc::new(Parameter::new_virtual(name, DeclaredType::Float4))
    }

    fn effect_sampler(name: &str) -> ParameterRef {
        Rc::new(Parameter::new_effect(name.into(), DeclaredType::Sampler2D, 0))
    }

    #[test]
    fn rejects_wrong_category() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let sampler = effect_sampler("scene");
        assert_eq!(
            Err(BindError::CategoryMismatch {
                expected: ParameterCategory::Float,
                actual: ParameterCategory::Sampler
            }),
            binder.set_scalar(&sampler, &[1.0])
        );

        let value = float("tint");
        assert!(binder.set_sampler(&value, Some(&texture(1))).is_err());
        assert!(binder.sampler(&value).is_err());
        assert_eq!(Ok(None), binder.sampler(&sampler).map(|t| t.map(|t| t.handle())));
        assert_eq!(
            Err(BindError::InvalidArgument("values")),
            binder.set_scalar(&value, &[0.0; 17])
        );

        let single = Parameter::new_virtual("time", DeclaredType::Float);
        assert_eq!(
            Err(BindError::InvalidArgument("values")),
            binder.set_scalar(&single, &[1.0, 2.0])
        );
        assert_eq!(Ok(()), binder.set_scalar(&single, &[1.0]));
    }

    #[test]
    fn attach_mismatch_changes_nothing() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let a = float("a");
        let b = effect_sampler("b");
        binder.set_scalar(&a, &[1.0, 2.0]).unwrap();
        binder.set_sampler(&b, Some(&texture(9))).unwrap();

        assert!(matches!(
            binder.attach(&a, &b),
            Err(BindError::CategoryMismatch { .. })
        ));
        assert_eq!(1.0, a.scalars().unwrap()[0]);
        assert_eq!(NativeHandle::new(9), b.texture().unwrap().handle());
        assert!(b.attached_to().is_none());
        assert!(a.attached().is_empty());
    }

    #[test]
    fn propagates_transitively() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let a = float("a");
        let b = float("b");
        let c = float("c");
        binder.attach(&a, &b).unwrap();
        binder.attach(&b, &c).unwrap();

        binder.set_scalar(&a, &[0.5, 0.25, 0.125, 1.0]).unwrap();
        assert_eq!(0.25, c.scalars().unwrap()[1]);
        assert!(Rc::ptr_eq(&a, &b.attached_to().unwrap()));

        // writes to an attached parameter only flow downstream
        binder.set_scalar(&b, &[3.0]).unwrap();
        assert_eq!(3.0, c.scalars().unwrap()[0]);
        assert_eq!(0.5, a.scalars().unwrap()[0]);
    }

    #[test]
    fn rejects_cycles() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let a = float("a");
        let b = float("b");
        let c = float("c");
        binder.attach(&a, &b).unwrap();
        binder.attach(&b, &c).unwrap();

        assert_eq!(Err(BindError::AttachCycle), binder.attach(&c, &a));
        assert_eq!(Err(BindError::AttachCycle), binder.attach(&a, &a));
        assert!(a.attached_to().is_none());
    }

    #[test]
    fn reattach_moves_target() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let a = float("a");
        let b = float("b");
        let target = float("target");
        binder.attach(&a, &target).unwrap();
        binder.attach(&b, &target).unwrap();

        assert!(a.attached().is_empty());
        binder.set_scalar(&a, &[4.0]).unwrap();
        assert_eq!(0.0, target.scalars().unwrap()[0]);
        binder.set_scalar(&b, &[5.0]).unwrap();
        assert_eq!(5.0, target.scalars().unwrap()[0]);

        assert!(binder.detach(&target));
        assert!(!binder.detach(&target));
        assert!(b.attached().is_empty());
    }

    #[test]
    fn pushes_effect_sampler_bindings() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let source = Rc::new(Parameter::new_virtual("scene", DeclaredType::Sampler2D));
        let sampler = effect_sampler("effect_scene");
        binder.attach(&source, &sampler).unwrap();

        binder.set_sampler(&source, Some(&texture(5))).unwrap();
        assert_eq!(
            vec![
                ("effect_scene".to_string(), None),
                ("effect_scene".to_string(), Some(NativeHandle::new(5)))
            ],
            *adapter.pushed.borrow()
        );
    }

    #[test]
    fn dropped_targets_are_pruned() {
        let adapter = RecordingAdapter::default();
        let binder = ParameterBinder::new(&adapter);
        let a = float("a");
        let b = float("b");
        binder.attach(&a, &b).unwrap();
        drop(b);

        binder.set_scalar(&a, &[1.0]).unwrap();
        assert!(a.attached.borrow().is_empty());
    }
}
