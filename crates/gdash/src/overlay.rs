//! layered settings
//!
//! Every panel kind has a settings struct whose [Default] is the built-in baseline, and an
//! overrides struct with the same fields wrapped in [Setting]. Configuration layers (the
//! provider `defaults` block, then the panel's own block) are read into overrides and
//! applied on top of the baseline with [resolve].
//!
//! Both structs are generated by the [settings] macro.
use crate::error::Error;
use crate::scope::Scope;

/// A value as written by one configuration layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    /// The attribute does not appear
    Unset,
    /// The attribute is set to `null`
    Null,
    Value(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Unset
    }
}

impl<T> Setting<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Setting::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Setting::Unset)
    }
}

impl<T: Clone> Setting<T> {
    /// Overwrite `target` if (and only if) a value is present
    pub fn apply_to(&self, target: &mut T, name: &str) {
        match self {
            Setting::Value(value) => *target = value.clone(),
            Setting::Null => tracing::trace!(setting = name, "null keeps previous value"),
            Setting::Unset => {}
        }
    }
}

/// A partial `T` supplied by a configuration layer
pub trait Overlay<T> {
    fn apply(&self, target: &mut T);
}

/// Apply `layers` in order on top of `defaults`
///
/// Later layers win per field. Fields that a layer leaves unset or sets to `null` keep the
/// value of the layer below.
pub fn resolve<T, O>(defaults: T, layers: &[&O]) -> T
where
    O: Overlay<T> + ?Sized,
{
    layers.iter().fold(defaults, |mut resolved, layer| {
        layer.apply(&mut resolved);
        resolved
    })
}

/// Overrides that are read from the attributes (and blocks) of a single hcl block
pub trait ReadBlock: Sized + Default {
    /// Attribute and block names understood by [ReadBlock::read]
    const KEYS: &'static [&'static str];

    /// Read the known keys, ignoring any others
    fn read(scope: &Scope<'_>) -> Result<Self, Error>;

    /// Read a block that consists of nothing but these overrides
    fn read_block(scope: Option<Scope<'_>>) -> Result<Self, Error> {
        let Some(scope) = scope else {
            return Ok(Self::default());
        };

        scope.deny_unknown(Self::KEYS)?;
        Self::read(&scope)
    }
}

/// Generate a settings struct (with its built-in default) and the matching overrides struct
///
/// Each field is read from the attribute with the same name. A reader function
/// `fn(&Scope, &str) -> Result<Setting<T>, Error>` can be given after `=>` for fields that
/// are written as blocks.
///
/// A field declared as `name: Type [TypeOverrides]` is itself a settings struct: its layer is
/// the nested overrides struct, merged field by field instead of replaced. The reader of such
/// a field returns `Result<TypeOverrides, Error>`.
macro_rules! settings {
    (
        $(#[$meta:meta])*
        pub struct $name:ident / $overrides:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty $([$layer:ty])? = $default:expr $(=> $reader:path)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $default, )*
                }
            }
        }

        #[doc = concat!("Partial [", stringify!($name), "] written by one configuration layer")]
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $overrides {
            $( pub $field: $crate::overlay::layer_type!($ty $(, $layer)?), )*
        }

        impl $crate::overlay::Overlay<$name> for $overrides {
            fn apply(&self, target: &mut $name) {
                $( self.$field.apply_to(&mut target.$field, stringify!($field)); )*
            }
        }

        impl $overrides {
            /// Merge into `target` when nested in another overrides struct
            #[allow(dead_code)]
            pub fn apply_to(&self, target: &mut $name, name: &str) {
                tracing::trace!(setting = name, "merging nested settings");
                $crate::overlay::Overlay::apply(self, target);
            }
        }

        impl $crate::overlay::ReadBlock for $overrides {
            const KEYS: &'static [&'static str] = &[$( stringify!($field) ),*];

            fn read(scope: &$crate::scope::Scope<'_>) -> Result<Self, $crate::error::Error> {
                Ok(Self {
                    $( $field: $crate::overlay::read_setting!(scope, stringify!($field) $(, $reader)?)?, )*
                })
            }
        }
    };
}

macro_rules! layer_type {
    ($ty:ty) => {
        $crate::overlay::Setting<$ty>
    };
    ($ty:ty, $layer:ty) => {
        $layer
    };
}

macro_rules! read_setting {
    ($scope:expr, $key:expr) => {
        $scope.attr($key)
    };
    ($scope:expr, $key:expr, $reader:path) => {
        $reader($scope, $key)
    };
}

pub(crate) use layer_type;
pub(crate) use read_setting;
pub(crate) use settings;
