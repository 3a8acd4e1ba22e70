//! Parameter and return types of bindings.
//!
//! Bindings describe the types they consume and produce with [`BindingType`]
//! rather than with `TypeId` alone. Runtime types carry the conversion rules
//! simple conversion needs; named types let registries built from metadata
//! describe types they cannot construct, compared by full name.

use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::converter::ConversionError;
use crate::converter::simple;
use crate::culture::BindingCulture;
use crate::datatable::DataTable;
use crate::value::StepValue;

/// Parses text into a boxed value under a culture.
pub type ConvertFn = fn(&str, &BindingCulture) -> Result<StepValue, ConversionError>;

/// How simple conversion produces a runtime type from text.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum TypeKind {
    /// A fieldless enum parsed case-insensitively by member name.
    Enum {
        /// Member names as declared.
        names: &'static [&'static str],
        /// Member lookup.
        parse: ConvertFn,
    },
    /// A UUID, accepting loose spellings; `nullable` types map empty text to
    /// `None`.
    Guid {
        /// Whether the type is `Option<Uuid>`.
        nullable: bool,
    },
    /// A scalar with a strict culture-aware parser that may decline, and a
    /// lenient fallback.
    Parse {
        /// Strict parser, tried first when present.
        strict: Option<ConvertFn>,
        /// Lenient parser used when the strict one is absent or declines.
        fallback: ConvertFn,
    },
    /// A type only reachable through identity or transformations.
    Opaque,
}

/// A type known at runtime, with its conversion rules.
#[derive(Debug, Clone)]
pub struct RuntimeBindingType {
    type_id: TypeId,
    full_name: &'static str,
    name: String,
    kind: TypeKind,
}

impl RuntimeBindingType {
    /// Describe `T` with explicit conversion rules.
    #[must_use]
    pub fn new<T: Any>(kind: TypeKind) -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            type_id: TypeId::of::<T>(),
            full_name,
            name: short_type_name(full_name),
            kind,
        }
    }

    /// Describe a type produced only by identity or transformations.
    #[must_use]
    pub fn opaque<T: Any>() -> Self {
        Self::new::<T>(TypeKind::Opaque)
    }

    /// Describe a type parsed with its [`FromStr`] implementation after
    /// trimming.
    #[must_use]
    pub fn parsed<T>() -> Self
    where
        T: FromStr + Any,
    {
        Self::new::<T>(TypeKind::Parse {
            strict: None,
            fallback: simple::parse_from_str::<T>,
        })
    }

    /// Describe a [`StepEnum`].
    #[must_use]
    pub fn enumeration<T: StepEnum>() -> Self {
        Self::new::<T>(TypeKind::Enum {
            names: T::NAMES,
            parse: simple::parse_enum::<T>,
        })
    }

    /// Runtime identifier of the type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Type name without module paths.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Conversion rules.
    #[must_use]
    pub const fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Returns `true` for [`StepEnum`] types.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    /// Returns `true` when `value` already holds this type.
    #[must_use]
    pub fn accepts(&self, value: &StepValue) -> bool {
        value.value_type_id() == self.type_id
    }
}

/// The declared type of a binding parameter or return value.
///
/// Equality is by type identity for runtime types and by full name
/// otherwise.
#[derive(Debug, Clone)]
pub enum BindingType {
    /// A type with runtime conversion rules.
    Runtime(RuntimeBindingType),
    /// A type known only by name.
    Named {
        /// Fully qualified name.
        full_name: String,
        /// Name without module paths.
        name: String,
    },
}

impl BindingType {
    /// Runtime binding type of `T`.
    #[must_use]
    pub fn of<T: BindableType>() -> Self {
        Self::Runtime(T::binding_type())
    }

    /// A type known only by its fully qualified name.
    #[must_use]
    pub fn named(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = short_type_name(&full_name);
        Self::Named { full_name, name }
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            Self::Runtime(runtime) => runtime.full_name(),
            Self::Named { full_name, .. } => full_name,
        }
    }

    /// Type name without module paths.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Runtime(runtime) => runtime.name(),
            Self::Named { name, .. } => name,
        }
    }

    /// Runtime description, when available.
    #[must_use]
    pub const fn as_runtime(&self) -> Option<&RuntimeBindingType> {
        match self {
            Self::Runtime(runtime) => Some(runtime),
            Self::Named { .. } => None,
        }
    }

    /// Returns `true` for [`DataTable`].
    #[must_use]
    pub fn is_table(&self) -> bool {
        match self {
            Self::Runtime(runtime) => runtime.type_id() == TypeId::of::<DataTable>(),
            Self::Named { full_name, .. } => full_name == std::any::type_name::<DataTable>(),
        }
    }

    /// Returns `true` for [`StepEnum`] types.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.as_runtime().is_some_and(RuntimeBindingType::is_enum)
    }
}

impl PartialEq for BindingType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Runtime(lhs), Self::Runtime(rhs)) => lhs.type_id == rhs.type_id,
            _ => self.full_name() == other.full_name(),
        }
    }
}

impl Eq for BindingType {}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<RuntimeBindingType> for BindingType {
    fn from(runtime: RuntimeBindingType) -> Self {
        Self::Runtime(runtime)
    }
}

/// Types usable as binding parameters and return values.
///
/// The default describes an opaque type, reachable only through identity
/// and transformations:
///
/// ```
/// use stepbind::{BindableType, BindingType};
///
/// struct Money(u32);
/// impl BindableType for Money {}
///
/// assert_eq!(BindingType::of::<Money>().name(), "Money");
/// ```
pub trait BindableType: Any + Sized {
    /// Runtime description of the type.
    #[must_use]
    fn binding_type() -> RuntimeBindingType {
        RuntimeBindingType::opaque::<Self>()
    }
}

/// Fieldless enums convertible from member names.
///
/// Implement with [`step_enum!`](crate::step_enum).
pub trait StepEnum: Any + Sized {
    /// Member names in declaration order.
    const NAMES: &'static [&'static str];

    /// Build the member whose name is at `index` in [`Self::NAMES`].
    fn from_index(index: usize) -> Option<Self>;

    /// Declared name of this member.
    fn name(&self) -> &'static str;
}

/// Implement [`StepEnum`] and [`BindableType`] for a fieldless enum.
///
/// Every member must be listed.
///
/// # Examples
///
/// ```
/// use stepbind::{BindingType, StepEnum, step_enum};
///
/// #[derive(Debug, PartialEq)]
/// enum Colour {
///     Red,
///     Green,
/// }
/// step_enum!(Colour { Red, Green });
///
/// assert!(BindingType::of::<Colour>().is_enum());
/// assert_eq!(Colour::Green.name(), "Green");
/// ```
#[macro_export]
macro_rules! step_enum {
    ($ty:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::StepEnum for $ty {
            const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn from_index(index: usize) -> ::std::option::Option<Self> {
                [$(Self::$variant),+].into_iter().nth(index)
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl $crate::BindableType for $ty {
            fn binding_type() -> $crate::RuntimeBindingType {
                $crate::RuntimeBindingType::enumeration::<Self>()
            }
        }
    };
}

macro_rules! scalar_binding_types {
    ($($ty:ty => $strict:expr, $fallback:expr;)+) => {
        $(
            impl BindableType for $ty {
                fn binding_type() -> RuntimeBindingType {
                    RuntimeBindingType::new::<Self>(TypeKind::Parse {
                        strict: $strict,
                        fallback: $fallback,
                    })
                }
            }
        )+
    };
}

scalar_binding_types! {
    i8 => None, simple::parse_integer::<i8>;
    i16 => None, simple::parse_integer::<i16>;
    i32 => None, simple::parse_integer::<i32>;
    i64 => None, simple::parse_integer::<i64>;
    i128 => None, simple::parse_integer::<i128>;
    isize => None, simple::parse_integer::<isize>;
    u8 => None, simple::parse_integer::<u8>;
    u16 => None, simple::parse_integer::<u16>;
    u32 => None, simple::parse_integer::<u32>;
    u64 => None, simple::parse_integer::<u64>;
    u128 => None, simple::parse_integer::<u128>;
    usize => None, simple::parse_integer::<usize>;
    f32 => Some(simple::parse_float_strict::<f32>), simple::parse_float_grouped::<f32>;
    f64 => Some(simple::parse_float_strict::<f64>), simple::parse_float_grouped::<f64>;
    bool => None, simple::parse_bool;
    char => None, simple::parse_char;
    String => None, simple::parse_text;
    NaiveDate => None, simple::parse_date;
    NaiveDateTime => None, simple::parse_datetime;
    NaiveTime => None, simple::parse_time;
}

impl BindableType for Uuid {
    fn binding_type() -> RuntimeBindingType {
        RuntimeBindingType::new::<Self>(TypeKind::Guid { nullable: false })
    }
}

impl BindableType for Option<Uuid> {
    fn binding_type() -> RuntimeBindingType {
        RuntimeBindingType::new::<Self>(TypeKind::Guid { nullable: true })
    }
}

impl BindableType for DataTable {}

/// Strip module paths from every path segment of a type name.
///
/// # Examples
///
/// ```
/// use stepbind::short_type_name;
///
/// assert_eq!(short_type_name("core::option::Option<uuid::Uuid>"), "Option<Uuid>");
/// assert_eq!(short_type_name("i32"), "i32");
/// ```
#[must_use]
pub fn short_type_name(full_name: &str) -> String {
    let mut short = String::with_capacity(full_name.len());
    let mut path = String::new();
    for ch in full_name.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
        } else {
            short.push_str(last_segment(&path));
            path.clear();
            short.push(ch);
        }
    }
    short.push_str(last_segment(&path));
    short
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
