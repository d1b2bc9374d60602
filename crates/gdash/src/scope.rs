//! typed access to the attributes and blocks of an hcl [Body]
//!
//! A [Scope] is a body together with its address (used in diagnostics) and the evaluation
//! context its expressions are evaluated in. Values are converted with [FromHcl]; a
//! conversion failure becomes [Error::TypeMismatch] naming the attribute path.
use crate::error::Error;
use crate::overlay::Setting;
use hcl::eval::{Context, Evaluate};
use hcl::{Body, Value};
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct Scope<'a> {
    path: String,
    body: &'a Body,
    context: &'a Context<'a>,
}

impl<'a> Scope<'a> {
    pub fn new(path: impl Into<String>, body: &'a Body, context: &'a Context<'a>) -> Self {
        Self {
            path: path.into(),
            body,
            context,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    /// Read an attribute keeping track of whether it was set, set to `null` or absent
    pub fn attr<T: FromHcl>(&self, key: &str) -> Result<Setting<T>, Error> {
        let Some(attribute) = self.body.attributes().find(|a| a.key.as_str() == key) else {
            return Ok(Setting::Unset);
        };

        let path = self.child_path(key);
        let value = attribute
            .expr
            .evaluate(self.context)
            .map_err(|source| Error::Evaluate {
                path: path.clone(),
                source,
            })?;

        if matches!(value, Value::Null) {
            return Ok(Setting::Null);
        }

        T::from_hcl(&value)
            .map(Setting::Value)
            .map_err(|expected| Error::TypeMismatch {
                path,
                expected,
                actual: kind_of(&value),
            })
    }

    /// Read an attribute, `null` and absence both yield `None`
    pub fn optional<T: FromHcl>(&self, key: &str) -> Result<Option<T>, Error> {
        Ok(self.attr(key)?.into_option())
    }

    pub fn required<T: FromHcl>(&self, key: &str) -> Result<T, Error> {
        self.optional(key)?.ok_or_else(|| Error::MissingAttribute {
            path: self.child_path(key),
        })
    }

    /// At most one block with the given identifier
    pub fn block(&self, ident: &str) -> Result<Option<Scope<'a>>, Error> {
        let mut blocks = self.blocks(ident);
        let first = blocks.next();
        if blocks.next().is_some() {
            return Err(Error::invalid(
                self.child_path(ident),
                "block may only be declared once",
            ));
        }

        Ok(first)
    }

    /// All blocks with the given identifier, in declaration order
    pub fn blocks<'s>(&'s self, ident: &'s str) -> impl Iterator<Item = Scope<'a>> + 's {
        let body: &'a Body = self.body;
        let context: &'a Context<'a> = self.context;
        body.blocks()
            .filter(move |block| block.identifier.as_str() == ident)
            .enumerate()
            .map(move |(index, block)| {
                Scope::new(
                    format!("{}.{}[{}]", self.path, ident, index),
                    &block.body,
                    context,
                )
            })
    }

    /// Every block with its identifier, in declaration order
    pub fn all_blocks(&self) -> Vec<(&'a str, Scope<'a>)> {
        let body: &'a Body = self.body;
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();

        body.blocks()
            .map(|block| {
                let ident = block.identifier.as_str();
                let index = seen.entry(ident).or_default();
                let path = format!("{}.{}[{}]", self.path, ident, index);
                *index += 1;
                (ident, Scope::new(path, &block.body, self.context))
            })
            .collect()
    }

    /// All blocks with the given identifier that carry exactly one label
    pub fn labeled_blocks(&self, ident: &str) -> Result<Vec<(String, Scope<'a>)>, Error> {
        let body: &'a Body = self.body;
        let mut found: Vec<(String, Scope<'a>)> = Vec::new();
        for block in body.blocks() {
            if block.identifier.as_str() != ident {
                continue;
            }

            let [label] = block.labels.as_slice() else {
                return Err(Error::invalid(
                    self.child_path(ident),
                    "block requires exactly one label",
                ));
            };

            let label = label.as_str().to_string();
            if found.iter().any(|(existing, _)| existing == &label) {
                return Err(Error::invalid(
                    format!("{}.{}", self.child_path(ident), label),
                    "block label declared more than once",
                ));
            }

            let path = format!("{}.{}", self.child_path(ident), label);
            found.push((label, Scope::new(path, &block.body, self.context)));
        }

        Ok(found)
    }

    /// The single sub-block out of `choices` that is present
    ///
    /// Used for blocks that behave like a union, e.g. `target { prometheus { .. } }`.
    pub fn one_of(&self, choices: &[&'static str]) -> Result<(&'static str, Scope<'a>), Error> {
        self.deny_unknown(choices)?;

        let mut selected = None;
        for choice in choices {
            if let Some(scope) = self.block(choice)? {
                if selected.is_some() {
                    return Err(Error::invalid(
                        self.path.clone(),
                        format!("only one of {} may be set", choices.join(", ")),
                    ));
                }
                selected = Some((*choice, scope));
            }
        }

        selected.ok_or_else(|| {
            Error::invalid(
                self.path.clone(),
                format!("one of {} must be set", choices.join(", ")),
            )
        })
    }

    /// Reject attributes and blocks not listed in `known`
    pub fn deny_unknown(&self, known: &[&str]) -> Result<(), Error> {
        let attributes = self.body.attributes().map(|a| a.key.as_str());
        let blocks = self.body.blocks().map(|b| b.identifier.as_str());

        match attributes.chain(blocks).find(|key| !known.contains(key)) {
            Some(unknown) => Err(Error::invalid(
                self.child_path(unknown),
                "unsupported attribute or block",
            )),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope").field("path", &self.path).finish()
    }
}

/// Human readable name of a value's type
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Conversion from an evaluated (non-null) hcl value
///
/// The error is a description of what was expected.
pub trait FromHcl: Sized {
    fn from_hcl(value: &Value) -> Result<Self, String>;
}

impl FromHcl for bool {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err("bool".to_string()),
        }
    }
}

impl FromHcl for String {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        // numbers and bools convert to strings implicitly, like in terraform
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err("string".to_string()),
        }
    }
}

impl FromHcl for u32 {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        let expected = || "non-negative whole number".to_string();
        let Value::Number(n) = value else {
            return Err(expected());
        };

        n.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(expected)
    }
}

impl FromHcl for f64 {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| "number".to_string()),
            _ => Err("number".to_string()),
        }
    }
}

impl FromHcl for serde_json::Number {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        let Value::Number(n) = value else {
            return Err("number".to_string());
        };

        if let Some(int) = n.as_i64() {
            return Ok(int.into());
        }
        if let Some(uint) = n.as_u64() {
            return Ok(uint.into());
        }

        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .ok_or_else(|| "finite number".to_string())
    }
}

impl<T: FromHcl> FromHcl for Option<T> {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        T::from_hcl(value).map(Some)
    }
}

impl<T: FromHcl> FromHcl for Vec<T> {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        let Value::Array(items) = value else {
            return Err("list".to_string());
        };

        items
            .iter()
            .map(T::from_hcl)
            .collect::<Result<_, _>>()
            .map_err(|expected| format!("list of {expected}"))
    }
}

impl<T: FromHcl> FromHcl for BTreeMap<String, T> {
    fn from_hcl(value: &Value) -> Result<Self, String> {
        let Value::Object(entries) = value else {
            return Err("object".to_string());
        };

        entries
            .iter()
            .map(|(key, value)| T::from_hcl(value).map(|value| (key.clone(), value)))
            .collect::<Result<_, _>>()
            .map_err(|expected| format!("object of {expected}"))
    }
}

/// Declare a fieldless enum that is written as a string in hcl and has a
/// (possibly differently spelled) name in the Grafana json model
///
/// ```ignore
/// hcl_enum! {
///     pub enum Orientation {
///         Auto = "auto" => "auto",
///     }
/// }
/// ```
macro_rules! hcl_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $hcl:literal => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Spelling used in hcl documents
            #[allow(dead_code)]
            pub const fn hcl_name(self) -> &'static str {
                match self {
                    $( Self::$variant => $hcl, )+
                }
            }

            /// Spelling used in the Grafana json model
            pub const fn wire_name(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl $crate::scope::FromHcl for $name {
            fn from_hcl(value: &hcl::Value) -> Result<Self, String> {
                let expected = || {
                    format!("one of {}", [$( concat!("\"", $hcl, "\"") ),+].join(", "))
                };

                match value {
                    hcl::Value::String(s) => match s.as_str() {
                        $( $hcl => Ok(Self::$variant), )+
                        _ => Err(expected()),
                    },
                    _ => Err(expected()),
                }
            }
        }
    };
}

pub(crate) use hcl_enum;

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    hcl_enum! {
        pub enum Fruit {
            Apple = "apple" => "Apple",
            BloodOrange = "blood_orange" => "bloodOrange",
        }
    }

    fn with_scope<R>(source: &str, f: impl FnOnce(Scope<'_>) -> R) -> R {
        let body: Body = hcl::parse(source).expect("body must parse");
        let context = Context::new();
        f(Scope::new("test", &body, &context))
    }

    #[test]
    fn tristate_attributes() {
        with_scope("set = 0\nexplicit_null = null", |scope| {
            assert_eq!(scope.attr::<u32>("set").unwrap(), Setting::Value(0));
            assert_eq!(scope.attr::<u32>("explicit_null").unwrap(), Setting::Null);
            assert_eq!(scope.attr::<u32>("absent").unwrap(), Setting::Unset);
        });
    }

    #[test]
    fn type_mismatch_names_path_and_types() {
        with_scope(r#"width = "wide""#, |scope| {
            let err = scope.attr::<u32>("width").unwrap_err();
            assert_eq!(
                err.to_string(),
                "test.width: expected non-negative whole number, found string"
            );
        });
    }

    #[test]
    fn enums_list_allowed_values() {
        with_scope("a = \"blood_orange\"\nb = \"kiwi\"", |scope| {
            assert_eq!(
                scope.attr::<Fruit>("a").unwrap(),
                Setting::Value(Fruit::BloodOrange)
            );
            assert_eq!(Fruit::BloodOrange.wire_name(), "bloodOrange");

            let err = scope.attr::<Fruit>("b").unwrap_err();
            assert_eq!(
                err.to_string(),
                r#"test.b: expected one of "apple", "blood_orange", found string"#
            );
        });
    }

    #[test]
    fn expressions_are_evaluated() {
        with_scope(r#"label = "${1 + 2} items""#, |scope| {
            assert_eq!(scope.required::<String>("label").unwrap(), "3 items");
        });
    }

    #[test]
    fn numbers_keep_integer_form() {
        with_scope("int = 80\nfloat = 0.5", |scope| {
            assert_eq!(
                scope.required::<serde_json::Number>("int").unwrap(),
                serde_json::Number::from(80)
            );
            assert_eq!(
                scope.required::<serde_json::Number>("float").unwrap().as_f64(),
                Some(0.5)
            );
        });
    }

    #[test]
    fn one_of_requires_exactly_one() {
        with_scope("a {}\nb {}", |scope| {
            let err = scope.one_of(&["a", "b"]).unwrap_err();
            assert_eq!(err.to_string(), "test: only one of a, b may be set");
        });

        with_scope("", |scope| {
            let err = scope.one_of(&["a", "b"]).unwrap_err();
            assert_eq!(err.to_string(), "test: one of a, b must be set");
        });

        with_scope("b { x = 1 }", |scope| {
            let (choice, inner) = scope.one_of(&["a", "b"]).unwrap();
            assert_eq!(choice, "b");
            assert_eq!(inner.path(), "test.b[0]");
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        with_scope("title = \"x\"\ntitel = \"y\"", |scope| {
            let err = scope.deny_unknown(&["title"]).unwrap_err();
            assert_eq!(err.to_string(), "test.titel: unsupported attribute or block");
        });
    }

    #[test]
    fn duplicate_single_block() {
        with_scope("options {}\noptions {}", |scope| {
            assert!(scope.block("options").is_err());
        });
    }
}
