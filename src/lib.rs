pub mod geodesy;
pub mod lifecycle;
pub mod localization;

use crate::lifecycle::LifecycleNode;
use crate::localization::LocalizationStack;

/// Core functionality for the fixed-frame GPS localizer
pub struct FixedFrameCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl FixedFrameCore {
    /// Create a new instance of FixedFrameCore
    pub fn new() -> Self {
        FixedFrameCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Initialize all registered components
    pub fn init(&mut self) -> Result<(), String> {
        for component in &mut self.components {
            component.on_configure()?;
            component.on_activate()?;
        }
        Ok(())
    }

    /// Shutdown all registered components
    pub fn shutdown(&mut self) -> Result<(), String> {
        for component in &mut self.components {
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        Ok(())
    }

    /// Get a reference to the localization stack
    pub fn localization_stack_mut(&mut self) -> Option<&mut LocalizationStack> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<LocalizationStack>())
    }
}

impl Default for FixedFrameCore {
    fn default() -> Self {
        FixedFrameCore::new()
    }
}
