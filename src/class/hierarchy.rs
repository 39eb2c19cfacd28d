//! This module contains the class-metadata service: the trait through which
//! the engine inspects loaded classes, and an in-memory implementation of it.

use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    fmt::Debug,
};

use crate::{
    class::ClassName,
    constant::{JAVA_CLONEABLE, JAVA_OBJECT, JAVA_SERIALIZABLE},
};

/// The access and kind flags of a class.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ClassFlags {
    pub is_interface: bool,
    pub is_abstract:  bool,
}

/// The flags of a method that matter to dispatch.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct MethodFlags {
    pub is_static:   bool,
    pub is_abstract: bool,
    pub is_private:  bool,
    pub is_native:   bool,
}

/// A method declared by a class.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MethodInfo {
    pub name:       String,
    pub descriptor: String,
    pub flags:      MethodFlags,
}

impl MethodInfo {
    /// Constructs a concrete instance method with `name` and `descriptor`.
    #[must_use]
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            descriptor: descriptor.into(),
            flags:      MethodFlags::default(),
        }
    }

    /// Marks the method as static.
    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.flags.is_static = true;
        self
    }

    /// Marks the method as abstract.
    #[must_use]
    pub fn as_abstract(mut self) -> Self {
        self.flags.is_abstract = true;
        self
    }

    /// Marks the method as private.
    #[must_use]
    pub fn as_private(mut self) -> Self {
        self.flags.is_private = true;
        self
    }

    /// Marks the method as native.
    #[must_use]
    pub fn as_native(mut self) -> Self {
        self.flags.is_native = true;
        self
    }

    /// Checks if the method has the provided `name` and `descriptor`.
    #[must_use]
    pub fn matches(&self, name: &str, descriptor: &str) -> bool {
        self.name == name && self.descriptor == descriptor
    }
}

/// The metadata of a loaded class or interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassFile {
    pub name:       ClassName,
    pub superclass: Option<ClassName>,
    pub interfaces: Vec<ClassName>,
    pub flags:      ClassFlags,
    pub methods:    Vec<MethodInfo>,
}

impl ClassFile {
    /// Constructs a concrete class called `name` that extends `superclass`.
    #[must_use]
    pub fn class(name: impl Into<ClassName>, superclass: impl Into<ClassName>) -> Self {
        Self {
            name:       name.into(),
            superclass: Some(superclass.into()),
            interfaces: Vec::new(),
            flags:      ClassFlags::default(),
            methods:    Vec::new(),
        }
    }

    /// Constructs an interface called `name`.
    #[must_use]
    pub fn interface(name: impl Into<ClassName>) -> Self {
        let flags = ClassFlags {
            is_interface: true,
            is_abstract:  true,
        };
        Self {
            name: name.into(),
            superclass: Some(ClassName::new(JAVA_OBJECT)),
            interfaces: Vec::new(),
            flags,
            methods: Vec::new(),
        }
    }

    /// Marks the class as abstract.
    #[must_use]
    pub fn as_abstract(mut self) -> Self {
        self.flags.is_abstract = true;
        self
    }

    /// Adds `interface` to the direct superinterfaces of the class.
    #[must_use]
    pub fn implementing(mut self, interface: impl Into<ClassName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Adds `method` to the methods declared by the class.
    #[must_use]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// Gets the method declared by this class with `name` and `descriptor`.
    #[must_use]
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.matches(name, descriptor))
    }

    /// Checks if this is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.is_interface
    }

    /// Checks if objects of exactly this class can be created.
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        !self.flags.is_interface && !self.flags.is_abstract
    }
}

/// The interface to the class-metadata service.
///
/// Implementors only need to provide access to the loaded classes, with the
/// subtyping queries being derived from those.
pub trait ClassHierarchy
where
    Self: Debug,
{
    /// Gets the metadata of the class called `name`, if it is loaded.
    fn class(&self, name: &ClassName) -> Option<&ClassFile>;

    /// Gets the names of all loaded classes in ascending order.
    fn known_classes(&self) -> Vec<&ClassName>;

    /// Checks if `name` is an array type or a loaded class.
    fn is_known(&self, name: &ClassName) -> bool {
        name.is_array() || self.class(name).is_some()
    }

    /// Gets the class called `name` followed by each of its superclasses, up
    /// to the root of the hierarchy.
    ///
    /// Classes that are not loaded end the chain.
    fn superclasses(&self, name: &ClassName) -> Vec<&ClassFile> {
        let mut chain = Vec::new();
        let mut current = self.class(name);
        while let Some(class) = current {
            if chain.iter().any(|c: &&ClassFile| c.name == class.name) {
                break;
            }
            chain.push(class);
            current = class.superclass.as_ref().and_then(|s| self.class(s));
        }
        chain
    }

    /// Gets every interface that the class called `name` implements, directly
    /// or indirectly, in breadth-first declaration order without repetition.
    fn superinterfaces(&self, name: &ClassName) -> Vec<&ClassFile> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&ClassName> = self
            .superclasses(name)
            .into_iter()
            .flat_map(|c| c.interfaces.iter())
            .collect();
        let mut found = Vec::new();
        while let Some(interface) = queue.pop_front() {
            if !seen.insert(interface.clone()) {
                continue;
            }
            if let Some(class) = self.class(interface) {
                found.push(class);
                queue.extend(class.interfaces.iter());
            }
        }
        found
    }

    /// Checks if `sub` is a subtype of `sup`.
    ///
    /// The relation is reflexive, and arrays are covariant in their
    /// reference component types.
    fn is_subclass(&self, sub: &ClassName, sup: &ClassName) -> bool {
        if sub == sup {
            return true;
        }
        if !sub.is_reference() || !sup.is_reference() {
            return false;
        }
        if sup.as_str() == JAVA_OBJECT {
            return true;
        }

        if sub.is_array() {
            return match (sub.component(), sup.component()) {
                (Some(sub_component), Some(sup_component)) => {
                    sub_component.is_reference()
                        && sup_component.is_reference()
                        && self.is_subclass(&sub_component, &sup_component)
                }
                _ => matches!(sup.as_str(), JAVA_CLONEABLE | JAVA_SERIALIZABLE),
            };
        }

        self.superclasses(sub).iter().any(|c| &c.name == sup)
            || self.superinterfaces(sub).iter().any(|c| &c.name == sup)
    }

    /// Gets the loaded classes that are subtypes of `name` and can be
    /// instantiated, in ascending order of name.
    ///
    /// An array type is its own only concrete subclass.
    fn concrete_subclasses(&self, name: &ClassName) -> Vec<ClassName> {
        if name.is_array() {
            return vec![name.clone()];
        }
        self.known_classes()
            .into_iter()
            .filter_map(|candidate| self.class(candidate))
            .filter(|candidate| candidate.is_instantiable())
            .filter(|candidate| self.is_subclass(&candidate.name, name))
            .map(|candidate| candidate.name.clone())
            .collect()
    }
}

/// An in-memory class hierarchy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassTable {
    classes: BTreeMap<ClassName, ClassFile>,
}

impl ClassTable {
    /// Constructs a class table with no classes at all.
    #[must_use]
    pub fn empty() -> Self {
        let classes = BTreeMap::new();
        Self { classes }
    }

    /// Constructs a class table containing the root of the hierarchy and the
    /// interfaces implemented by arrays.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self::empty();
        let mut object = ClassFile::class(JAVA_OBJECT, JAVA_OBJECT);
        object.superclass = None;
        table.insert(object);
        table.insert(ClassFile::interface(JAVA_CLONEABLE));
        table.insert(ClassFile::interface(JAVA_SERIALIZABLE));
        table
    }

    /// Adds `class` to the table, replacing any class with the same name.
    pub fn insert(&mut self, class: ClassFile) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Adds `class` to the table, returning the table.
    #[must_use]
    pub fn with(mut self, class: ClassFile) -> Self {
        self.insert(class);
        self
    }

    /// Gets the number of classes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Checks if the table has no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassHierarchy for ClassTable {
    fn class(&self, name: &ClassName) -> Option<&ClassFile> {
        self.classes.get(name)
    }

    fn known_classes(&self) -> Vec<&ClassName> {
        self.classes.keys().collect()
    }
}

#[cfg(test)]
mod test {
    use crate::class::{
        hierarchy::{ClassFile, ClassHierarchy, ClassTable},
        ClassName,
    };

    fn table() -> ClassTable {
        ClassTable::new()
            .with(ClassFile::interface("pkg/Shape"))
            .with(ClassFile::interface("pkg/Solid").implementing("pkg/Shape"))
            .with(ClassFile::class("pkg/Base", "java/lang/Object").as_abstract())
            .with(ClassFile::class("pkg/Cube", "pkg/Base").implementing("pkg/Solid"))
            .with(ClassFile::class("pkg/Ball", "pkg/Base"))
    }

    #[test]
    fn subclassing_follows_superclasses_and_interfaces() {
        let table = table();
        let cube = ClassName::new("pkg/Cube");

        assert!(table.is_subclass(&cube, &cube));
        assert!(table.is_subclass(&cube, &"pkg/Base".into()));
        assert!(table.is_subclass(&cube, &"pkg/Shape".into()));
        assert!(table.is_subclass(&cube, &"java/lang/Object".into()));
        assert!(!table.is_subclass(&"pkg/Ball".into(), &"pkg/Shape".into()));
        assert!(!table.is_subclass(&"pkg/Base".into(), &cube));
    }

    #[test]
    fn arrays_are_covariant() {
        let table = table();
        let cubes = ClassName::new("pkg/Cube").array_of();
        let shapes = ClassName::new("pkg/Shape").array_of();

        assert!(table.is_subclass(&cubes, &shapes));
        assert!(!table.is_subclass(&shapes, &cubes));
        assert!(table.is_subclass(&cubes, &"java/lang/Cloneable".into()));
        assert!(table.is_subclass(&cubes, &"java/lang/Object".into()));
        assert!(!table.is_subclass(&"[I".into(), &"[J".into()));
    }

    #[test]
    fn concrete_subclasses_are_sorted_and_instantiable() {
        let table = table();
        let concrete = table.concrete_subclasses(&"pkg/Base".into());
        assert_eq!(concrete, vec![
            ClassName::new("pkg/Ball"),
            ClassName::new("pkg/Cube")
        ]);

        let shapes = table.concrete_subclasses(&"pkg/Shape".into());
        assert_eq!(shapes, vec![ClassName::new("pkg/Cube")]);
    }

    #[test]
    fn superinterfaces_are_transitive() {
        let table = table();
        let names: Vec<&str> = table
            .superinterfaces(&"pkg/Cube".into())
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["pkg/Solid", "pkg/Shape"]);
    }
}
