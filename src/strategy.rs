//! Construction strategies: how a pool builds a brand-new instance

use crate::errors::ConstructionError;
use crate::lifecycle::{Blueprint, LifecycleListener};

/// Builds new instances when the pool has nothing to reuse
///
/// Any `FnMut() -> Result<Blueprint<T>, ConstructionError>` closure is a
/// strategy.
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{Blueprint, ConstructionError, ConstructionStrategy};
///
/// let mut next = 0;
/// let mut strategy = move || -> Result<Blueprint<u32>, ConstructionError> {
///     next += 1;
///     Ok(Blueprint::new(next))
/// };
///
/// assert_eq!(*strategy.construct().unwrap().instance(), 1);
/// assert_eq!(*strategy.construct().unwrap().instance(), 2);
/// ```
pub trait ConstructionStrategy<T> {
    /// Produce a new instance, or fail with
    /// [`ConstructionError::MissingTemplate`] when there is nothing to build
    /// from.
    fn construct(&mut self) -> Result<Blueprint<T>, ConstructionError>;
}

impl<T, F> ConstructionStrategy<T> for F
where
    F: FnMut() -> Result<Blueprint<T>, ConstructionError>,
{
    fn construct(&mut self) -> Result<Blueprint<T>, ConstructionError> {
        self()
    }
}

type ListenerFactory<T> = Box<dyn FnMut() -> Box<dyn LifecycleListener<T>>>;

/// Strategy that duplicates a prototype
///
/// Each construction clones the template and attaches one listener from
/// every registered factory, in registration order.
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{ConstructionError, ConstructionStrategy, TemplateStrategy};
///
/// let mut strategy = TemplateStrategy::<String>::empty();
/// assert!(matches!(
///     strategy.construct(),
///     Err(ConstructionError::MissingTemplate)
/// ));
///
/// strategy.set_template("spark".to_string());
/// assert_eq!(strategy.construct().unwrap().instance(), "spark");
/// ```
pub struct TemplateStrategy<T> {
    template: Option<T>,
    factories: Vec<ListenerFactory<T>>,
}

impl<T: Clone + 'static> TemplateStrategy<T> {
    pub fn new(template: T) -> Self {
        Self {
            template: Some(template),
            factories: Vec::new(),
        }
    }

    /// A strategy with no template yet; constructing fails until one is set
    pub fn empty() -> Self {
        Self {
            template: None,
            factories: Vec::new(),
        }
    }

    pub fn set_template(&mut self, template: T) {
        self.template = Some(template);
    }

    pub fn take_template(&mut self) -> Option<T> {
        self.template.take()
    }

    pub fn template(&self) -> Option<&T> {
        self.template.as_ref()
    }

    /// Attach a listener built by `factory` to every constructed instance
    pub fn with_listener<F, L>(mut self, mut factory: F) -> Self
    where
        F: FnMut() -> L + 'static,
        L: LifecycleListener<T> + 'static,
    {
        self.factories
            .push(Box::new(move || Box::new(factory()) as Box<dyn LifecycleListener<T>>));
        self
    }
}

impl<T: Clone + 'static> ConstructionStrategy<T> for TemplateStrategy<T> {
    fn construct(&mut self) -> Result<Blueprint<T>, ConstructionError> {
        let template = self
            .template
            .as_ref()
            .ok_or(ConstructionError::MissingTemplate)?;

        let mut blueprint = Blueprint::new(template.clone());
        for factory in self.factories.iter_mut() {
            blueprint.listeners.push(factory());
        }
        Ok(blueprint)
    }
}
