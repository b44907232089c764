//! Object lookup by class id and logical name

use crate::object::CosemObject;
use cosem_core::ObisCode;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Central object registry.
///
/// Objects are shared behind `Arc<Mutex<..>>` and addressed by stable
/// (class id, logical name) keys, so capture columns and sort objects
/// reference targets without owning them.
#[derive(Default)]
pub struct ObjectRegistry {
    objects: HashMap<(u16, ObisCode), Arc<Mutex<dyn CosemObject + Send>>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object, replacing any previous entry under its key.
    pub fn register(&mut self, object: Arc<Mutex<dyn CosemObject + Send>>) {
        let key = match object.lock() {
            Ok(guard) => (guard.class_id(), guard.logical_name()),
            Err(poisoned) => {
                let guard = poisoned.into_inner();
                (guard.class_id(), guard.logical_name())
            }
        };
        debug!("Registered class {} object {}", key.0, key.1);
        self.objects.insert(key, object);
    }

    pub fn find(
        &self,
        class_id: u16,
        logical_name: ObisCode,
    ) -> Option<Arc<Mutex<dyn CosemObject + Send>>> {
        self.objects.get(&(class_id, logical_name)).cloned()
    }

    pub fn remove(
        &mut self,
        class_id: u16,
        logical_name: ObisCode,
    ) -> Option<Arc<Mutex<dyn CosemObject + Send>>> {
        self.objects.remove(&(class_id, logical_name))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Data;
    use crate::selective::AccessSelector;
    use cosem_core::DataObject;

    #[test]
    fn test_register_and_find() {
        let mut registry = ObjectRegistry::new();
        let ln = ObisCode::new(1, 0, 1, 8, 0, 255);
        registry.register(Arc::new(Mutex::new(Data::new(
            ln,
            DataObject::Unsigned32(42),
        ))));

        assert_eq!(registry.len(), 1);
        let found = registry.find(Data::CLASS_ID, ln).unwrap();
        let value = found
            .lock()
            .unwrap()
            .get_attribute(2, &AccessSelector::All, None)
            .unwrap();
        assert_eq!(value, DataObject::Unsigned32(42));

        assert!(registry.find(Data::CLASS_ID, ObisCode::new(1, 0, 2, 8, 0, 255)).is_none());
        assert!(registry.find(7, ln).is_none());
    }

    #[test]
    fn test_remove() {
        let mut registry = ObjectRegistry::new();
        let ln = ObisCode::new(1, 0, 1, 8, 0, 255);
        registry.register(Arc::new(Mutex::new(Data::new(ln, DataObject::Null))));
        assert!(registry.remove(Data::CLASS_ID, ln).is_some());
        assert!(registry.is_empty());
    }
}
