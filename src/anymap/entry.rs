use std::any::{type_name, Any};
use std::fmt;

/// A stored value together with the name of its concrete type.
///
/// The name is only used for diagnostics, type checks go through `TypeId`.
pub struct Entry {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Entry {
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<V>(),
        }
    }

    /// Name of the concrete type the entry was stored with
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.inner().downcast_ref::<V>()
    }

    // Going through the trait object avoids asking the Box itself for its type.
    fn inner(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
