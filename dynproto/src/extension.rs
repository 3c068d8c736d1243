use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::descriptor::{DescriptorPool, FieldDescriptor, MessageDescriptor};

/// The extensions a parser should recognize, keyed by extended message and field number.
///
/// A registry is built up front and then only read. Parsing with
/// [`ExtensionRegistry::empty`] treats every extension as an unknown field.
#[derive(Clone, Debug, Default)]
pub struct ExtensionRegistry {
    /// Keyed by extendee identity. Each stored descriptor keeps its pool, and so the key,
    /// alive.
    by_number: BTreeMap<((usize, usize), u32), FieldDescriptor>,
    by_name: BTreeMap<String, FieldDescriptor>,
}

static EMPTY: ExtensionRegistry = ExtensionRegistry::new();

impl ExtensionRegistry {
    pub const fn new() -> ExtensionRegistry {
        ExtensionRegistry {
            by_number: BTreeMap::new(),
            by_name: BTreeMap::new(),
        }
    }

    /// A shared registry with no extensions.
    pub fn empty() -> &'static ExtensionRegistry {
        &EMPTY
    }

    /// A registry holding every extension defined in `pool`.
    pub fn from_pool(pool: &DescriptorPool) -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        for extension in pool.all_extensions() {
            registry.add(extension);
        }
        registry
    }

    /// Registers an extension, replacing any previous extension with the same extendee and
    /// number.
    ///
    /// # Panics
    ///
    /// Panics if `extension` is a declared field rather than an extension.
    pub fn add(&mut self, extension: FieldDescriptor) {
        assert!(
            extension.is_extension(),
            "{} is not an extension",
            extension.full_name()
        );
        let key = (extension.containing_message().identity(), extension.number());
        self.by_name
            .insert(String::from(extension.full_name()), extension.clone());
        self.by_number.insert(key, extension);
    }

    /// Finds the extension of `message` numbered `number`. Extensions of a same-named message
    /// from a different pool do not match.
    pub fn find_by_number(
        &self,
        message: &MessageDescriptor,
        number: u32,
    ) -> Option<&FieldDescriptor> {
        self.by_number.get(&(message.identity(), number))
    }

    pub fn find_by_name(&self, full_name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(full_name)
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}
