//! Type system for Compiscript
//!
//! A closed variant over primitives, functions, classes and arrays.
//! Function and array equality is structural; class equality is nominal
//! (by name, resolved through the [`ClassRegistry`]).

use indexmap::IndexMap;

/// Base types in the language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Integer type
    Int,
    /// Floating-point type
    Float,
    /// Boolean type
    Bool,
    /// String type
    Str,
    /// Void (function without return value)
    Void,
    /// Null, also used as the "no type" result of failed inference
    Null,
    /// Function type: return type plus parameter types
    Function(Box<FunctionType>),
    /// Class instance type, nominal by name
    Class(String),
    /// Array type with element type; `Array(Null)` is the type of `[]`
    Array(Box<Type>),
}

/// Signature of a function or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub return_type: Type,
    pub param_types: Vec<Type>,
}

impl FunctionType {
    pub fn new(return_type: Type, param_types: Vec<Type>) -> Self {
        FunctionType {
            return_type,
            param_types,
        }
    }
}

impl Type {
    pub fn function(return_type: Type, param_types: Vec<Type>) -> Self {
        Type::Function(Box::new(FunctionType::new(return_type, param_types)))
    }

    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    /// True for `integer` and `float`
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "integer"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "boolean"),
            Type::Str => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Function(ft) => {
                let params: Vec<String> = ft.param_types.iter().map(|p| p.to_string()).collect();
                write!(f, "fn({}) -> {}", params.join(", "), ft.return_type)
            }
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

/// Assignability: identity, the `int -> float` widening, the empty array
/// literal (`Array(Null)`) into any array type, and element-wise array
/// compatibility otherwise.
pub fn assignable(expected: &Type, actual: &Type) -> bool {
    if expected == actual {
        return true;
    }
    if *expected == Type::Float && *actual == Type::Int {
        return true;
    }
    if let (Type::Array(exp_elem), Type::Array(act_elem)) = (expected, actual) {
        if **act_elem == Type::Null {
            return true;
        }
        return assignable(exp_elem, act_elem);
    }
    false
}

/// A class declaration as seen by the semantic pass: its own fields in
/// declaration order (base-class fields excluded) and its methods.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub base: Option<String>,
    pub fields: IndexMap<String, Type>,
    pub methods: IndexMap<String, FunctionType>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, base: Option<String>) -> Self {
        ClassInfo {
            name: name.into(),
            base,
            fields: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn has_constructor(&self) -> bool {
        self.methods.contains_key("constructor")
    }
}

/// Registry of all declared classes, in declaration order.
///
/// Field and method lookups walk the base-class chain.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassInfo>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry::default()
    }

    pub fn declare(&mut self, info: ClassInfo) {
        self.classes.insert(info.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        self.classes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    /// Resolve a field type, walking the base-class chain
    pub fn field_type(&self, class: &str, field: &str) -> Option<&Type> {
        let mut current = self.get(class);
        while let Some(info) = current {
            if let Some(ty) = info.fields.get(field) {
                return Some(ty);
            }
            current = info.base.as_deref().and_then(|b| self.get(b));
        }
        None
    }

    /// Resolve a method signature, walking the base-class chain
    pub fn method(&self, class: &str, name: &str) -> Option<&FunctionType> {
        let mut current = self.get(class);
        while let Some(info) = current {
            if let Some(sig) = info.methods.get(name) {
                return Some(sig);
            }
            current = info.base.as_deref().and_then(|b| self.get(b));
        }
        None
    }

    /// All field slots of a class in layout order: base-class fields first,
    /// then own fields, each in declaration order.
    pub fn field_slots(&self, class: &str) -> Vec<(String, Type)> {
        let mut chain = Vec::new();
        let mut current = self.get(class);
        while let Some(info) = current {
            chain.push(info);
            current = info.base.as_deref().and_then(|b| self.get(b));
        }
        let mut slots = Vec::new();
        for info in chain.iter().rev() {
            for (name, ty) in &info.fields {
                slots.push((name.clone(), ty.clone()));
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_primitives() {
        assert_eq!(Type::Int.to_string(), "integer");
        assert_eq!(Type::array(Type::Str).to_string(), "string[]");
        assert_eq!(
            Type::function(Type::Void, vec![Type::Int, Type::Bool]).to_string(),
            "fn(integer, boolean) -> void"
        );
    }

    #[test]
    fn test_assignable_identity_and_widening() {
        assert!(assignable(&Type::Int, &Type::Int));
        assert!(assignable(&Type::Float, &Type::Int));
        assert!(!assignable(&Type::Int, &Type::Float));
        assert!(!assignable(&Type::Str, &Type::Int));
    }

    #[test]
    fn test_assignable_empty_array_literal() {
        let empty = Type::array(Type::Null);
        assert!(assignable(&Type::array(Type::Int), &empty));
        assert!(assignable(&Type::array(Type::array(Type::Str)), &empty));
        // nested empties stay polymorphic
        let nested_empty = Type::array(Type::array(Type::Null));
        assert!(assignable(
            &Type::array(Type::array(Type::Int)),
            &nested_empty
        ));
    }

    #[test]
    fn test_class_equality_is_nominal() {
        assert_eq!(
            Type::Class("Persona".to_string()),
            Type::Class("Persona".to_string())
        );
        assert_ne!(
            Type::Class("Persona".to_string()),
            Type::Class("Animal".to_string())
        );
    }

    #[test]
    fn test_registry_base_walk() {
        let mut reg = ClassRegistry::new();
        let mut animal = ClassInfo::new("Animal", None);
        animal.fields.insert("nombre".to_string(), Type::Str);
        animal
            .methods
            .insert("saludar".to_string(), FunctionType::new(Type::Void, vec![]));
        reg.declare(animal);

        let mut perro = ClassInfo::new("Perro", Some("Animal".to_string()));
        perro.fields.insert("edad".to_string(), Type::Int);
        reg.declare(perro);

        assert_eq!(reg.field_type("Perro", "nombre"), Some(&Type::Str));
        assert_eq!(reg.field_type("Perro", "edad"), Some(&Type::Int));
        assert!(reg.method("Perro", "saludar").is_some());
        assert!(reg.field_type("Perro", "color").is_none());
    }

    #[test]
    fn test_field_slots_base_first() {
        let mut reg = ClassRegistry::new();
        let mut animal = ClassInfo::new("Animal", None);
        animal.fields.insert("nombre".to_string(), Type::Str);
        reg.declare(animal);

        let mut perro = ClassInfo::new("Perro", Some("Animal".to_string()));
        perro.fields.insert("edad".to_string(), Type::Int);
        perro.fields.insert("color".to_string(), Type::Str);
        reg.declare(perro);

        let slots = reg.field_slots("Perro");
        let names: Vec<&str> = slots.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["nombre", "edad", "color"]);
    }
}
