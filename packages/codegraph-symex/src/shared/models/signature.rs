//! Erasure-level method signatures
//!
//! Signatures are the cache keys of method behaviors and have the shape
//! `Owner#name(ParameterDescriptors)ReturnDescriptor`, with JVM field descriptors:
//!
//! ```text
//! java.util.Objects#requireNonNull(Ljava/lang/Object;)Ljava/lang/Object;
//! org.foo.A#<init>(IZ)V
//! ```

use std::fmt;

use crate::errors::{Result, SymexError};

/// One parameter or return type of a signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
    /// Fully qualified class name, dotted
    Object(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Primitive boolean or its box
    pub fn is_boolean(&self) -> bool {
        match self {
            TypeDescriptor::Boolean => true,
            TypeDescriptor::Object(name) => name == "java.lang.Boolean",
            _ => false,
        }
    }

    /// Primitive type (never null)
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            TypeDescriptor::Object(_) | TypeDescriptor::Array(_) | TypeDescriptor::Void
        )
    }

    fn parse(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Self> {
        let ty = match chars.next()? {
            'Z' => TypeDescriptor::Boolean,
            'B' => TypeDescriptor::Byte,
            'C' => TypeDescriptor::Char,
            'S' => TypeDescriptor::Short,
            'I' => TypeDescriptor::Int,
            'J' => TypeDescriptor::Long,
            'F' => TypeDescriptor::Float,
            'D' => TypeDescriptor::Double,
            'V' => TypeDescriptor::Void,
            '[' => TypeDescriptor::Array(Box::new(Self::parse(chars)?)),
            'L' => {
                let mut name = String::new();
                loop {
                    match chars.next()? {
                        ';' => break,
                        '/' => name.push('.'),
                        c => name.push(c),
                    }
                }
                if name.is_empty() {
                    return None;
                }
                TypeDescriptor::Object(name)
            }
            _ => return None,
        };
        Some(ty)
    }
}

/// Parsed method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    raw: String,
    owner: String,
    name: String,
    parameters: Vec<TypeDescriptor>,
    return_type: TypeDescriptor,
}

impl MethodSignature {
    /// Parse `Owner#name(Descriptors)Return`
    pub fn parse(signature: &str) -> Result<Self> {
        let invalid = || SymexError::invalid_signature(signature);

        let (owner, rest) = signature.split_once('#').ok_or_else(invalid)?;
        let (name, descriptor) = rest.split_once('(').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        let mut chars = descriptor.chars().peekable();
        let mut parameters = Vec::new();
        loop {
            match chars.peek() {
                Some(')') => {
                    chars.next();
                    break;
                }
                Some(_) => {
                    let param = TypeDescriptor::parse(&mut chars).ok_or_else(invalid)?;
                    if param == TypeDescriptor::Void {
                        return Err(invalid());
                    }
                    parameters.push(param);
                }
                None => return Err(invalid()),
            }
        }
        let return_type = TypeDescriptor::parse(&mut chars).ok_or_else(invalid)?;
        if chars.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            raw: signature.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            parameters,
            return_type,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Owner#name`, the prefix used by blacklist entries
    pub fn qualified_name(&self) -> String {
        format!("{}#{}", self.owner, self.name)
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_void(&self) -> bool {
        self.return_type == TypeDescriptor::Void
    }

    /// True when an exit must carry a value
    pub fn expects_return_value(&self) -> bool {
        !self.is_constructor() && !self.is_void()
    }

    pub fn parameter_is_boolean(&self, index: usize) -> bool {
        self.parameters.get(index).is_some_and(TypeDescriptor::is_boolean)
    }

    /// `boolean equals(Object)`
    pub fn is_equals_method(&self) -> bool {
        self.name == "equals"
            && self.return_type == TypeDescriptor::Boolean
            && self.parameters == [TypeDescriptor::Object("java.lang.Object".to_string())]
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
