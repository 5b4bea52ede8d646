//! Checker-side type model
//!
//! Types are names plus a couple of shape flags. The sentinel name `infer`
//! stands for a not-yet-resolved binding type and is compatible with
//! everything while resolution is in progress.

/// The name a let binding carries until its type is known.
pub const INFER: &str = "infer";

/// The unit type, spelled `()` in source.
pub const UNIT: &str = "()";

/// Information about a source-level type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Type name: `i32`, `String`, `()`, `infer`, or a user struct name.
    pub name: String,
    pub is_array: bool,
    pub is_reference: bool,
}

impl TypeInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: false,
            is_reference: false,
        }
    }

    pub fn unit() -> Self {
        Self::named(UNIT)
    }

    pub fn is_infer(&self) -> bool {
        self.name == INFER
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.name.as_str(),
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "f32" | "f64"
        )
    }

    pub fn is_bool(&self) -> bool {
        self.name == "bool"
    }
}

/// Two types are compatible iff either is still being inferred, they are the
/// `str`/`String` pair in either order, or their names are equal. There is
/// no implicit numeric widening.
pub fn types_compatible(a: &TypeInfo, b: &TypeInfo) -> bool {
    if a.is_infer() || b.is_infer() {
        return true;
    }
    if (a.name == "str" && b.name == "String") || (a.name == "String" && b.name == "str") {
        return true;
    }
    a.name == b.name
}
