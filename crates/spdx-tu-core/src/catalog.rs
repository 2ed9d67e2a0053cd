//! Type Catalog: the declared object model.
//!
//! The catalog is loaded once from a declarative description and is immutable
//! afterwards. It is `Send + Sync` and is meant to be shared through an `Arc`
//! and handed explicitly to every component that needs it.
//!
//! ## Description format
//!
//! ```text
//! { "meta": {...},
//!   "types": [ [name, base, [options], description, [fields | enumerants]] ] }
//! ```
//!
//! Fields are `[ordinal, name, type, [options], description]`, enumerants are
//! `[code, name, description]`. Options are short strings:
//!
//! | option | meaning |
//! |---|---|
//! | `[n` | minimum cardinality (default 1) |
//! | `]n` | maximum cardinality, `0` = unbounded (default 1) |
//! | `q` | items must be unique |
//! | `/f` | format tag (`iri`, `uri`, `id-ref`, `email`, `date-time`, `x`, `license-id`) |
//! | `{n` / `}n` | minimum / maximum length, byte count or item count |
//! | `%re` | pattern the whole string must match |
//! | `K` / `L` | primary key / link to another Element |
//! | `+T` / `*T` | key / value type of a MapOf or ArrayOf |

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use regex::Regex;
use serde_json::Value as Json;

use crate::error::SchemaError;

/// The SPDX v3 description shipped with this crate.
pub const SPDX_V3_DESCRIPTION: &str = include_str!("../schema/spdx-v3.json");

/// Base type of a declared or primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Binary,
    Boolean,
    Integer,
    String,
    ArrayOf,
    Choice,
    Enumerated,
    Map,
    MapOf,
    Record,
}

impl BaseType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Binary" => Some(Self::Binary),
            "Boolean" => Some(Self::Boolean),
            "Integer" => Some(Self::Integer),
            "String" => Some(Self::String),
            "ArrayOf" => Some(Self::ArrayOf),
            "Choice" => Some(Self::Choice),
            "Enumerated" => Some(Self::Enumerated),
            "Map" => Some(Self::Map),
            "MapOf" => Some(Self::MapOf),
            "Record" => Some(Self::Record),
            _ => None,
        }
    }

    /// Whether this base type may be used directly as a field type.
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::Binary | Self::Boolean | Self::Integer | Self::String)
    }

    /// Whether values of this type carry named fields.
    pub fn has_fields(self) -> bool {
        matches!(self, Self::Record | Self::Choice | Self::Map)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::ArrayOf => "ArrayOf",
            Self::Choice => "Choice",
            Self::Enumerated => "Enumerated",
            Self::Map => "Map",
            Self::MapOf => "MapOf",
            Self::Record => "Record",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive format tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Absolute IRI.
    Iri,
    /// Absolute URI denoting a locator.
    Uri,
    /// Absolute IRI, `prefix:local` or bare local id.
    IdRef,
    /// RFC 2822 addr-spec.
    Email,
    /// RFC 3339 timestamp.
    DateTime,
    /// Binary written as hex text in the verbose form.
    Hex,
    /// Member of the injected license registry.
    LicenseId,
}

impl Format {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "iri" => Some(Self::Iri),
            "uri" => Some(Self::Uri),
            "id-ref" => Some(Self::IdRef),
            "email" => Some(Self::Email),
            "date-time" => Some(Self::DateTime),
            "x" => Some(Self::Hex),
            "license-id" => Some(Self::LicenseId),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iri => "iri",
            Self::Uri => "uri",
            Self::IdRef => "id-ref",
            Self::Email => "email",
            Self::DateTime => "date-time",
            Self::Hex => "x",
            Self::LicenseId => "license-id",
        }
    }
}

/// Options attached to a type or a field.
#[derive(Debug, Clone, Default)]
pub struct TypeOptions {
    pub format: Option<Format>,
    pub pattern: Option<Regex>,
    pub min_size: Option<i64>,
    pub max_size: Option<i64>,
    pub unique: bool,
    pub key_type: Option<String>,
    pub value_type: Option<String>,
    pub key: bool,
    pub link: bool,
}

impl TypeOptions {
    /// Options of `self` with anything set in `field` taking precedence.
    pub fn overlay(&self, field: &TypeOptions) -> TypeOptions {
        TypeOptions {
            format: field.format.or(self.format),
            pattern: field.pattern.clone().or_else(|| self.pattern.clone()),
            min_size: field.min_size.or(self.min_size),
            max_size: field.max_size.or(self.max_size),
            unique: field.unique || self.unique,
            key_type: field.key_type.clone().or_else(|| self.key_type.clone()),
            value_type: field.value_type.clone().or_else(|| self.value_type.clone()),
            key: field.key || self.key,
            link: field.link || self.link,
        }
    }
}

/// A field of a Record, Choice or Map.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub ordinal: u64,
    pub name: String,
    pub type_ref: String,
    /// Minimum number of values (0 = optional).
    pub min: u64,
    /// Maximum number of values, `None` = unbounded.
    pub max: Option<u64>,
    pub options: TypeOptions,
    pub description: String,
}

impl FieldDef {
    /// Repeated fields hold an array of values.
    pub fn is_repeated(&self) -> bool {
        self.max != Some(1)
    }

    pub fn is_optional(&self) -> bool {
        self.min == 0
    }
}

/// A declared value of an Enumerated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerant {
    pub code: u64,
    pub name: String,
    pub description: String,
}

/// A declared type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub base: BaseType,
    pub options: TypeOptions,
    pub description: String,
    pub fields: Vec<FieldDef>,
    pub enumerants: Vec<Enumerant>,
}

impl TypeDef {
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_ordinal(&self, ordinal: u64) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.ordinal == ordinal)
    }

    pub fn enumerant_by_code(&self, code: u64) -> Option<&Enumerant> {
        self.enumerants.iter().find(|e| e.code == code)
    }

    pub fn enumerant_by_name(&self, name: &str) -> Option<&Enumerant> {
        self.enumerants.iter().find(|e| e.name == name)
    }
}

/// A type reference resolved against the catalog.
#[derive(Debug, Clone, Copy)]
pub enum TypeShape<'a> {
    /// One of the primitive base types, used directly.
    Primitive(BaseType),
    /// A declared type.
    Defined(&'a TypeDef),
}

impl<'a> TypeShape<'a> {
    pub fn base(&self) -> BaseType {
        match self {
            Self::Primitive(base) => *base,
            Self::Defined(def) => def.base,
        }
    }

    /// The declared type, if this is not a bare primitive.
    pub fn def(&self) -> Option<&'a TypeDef> {
        match self {
            Self::Primitive(_) => None,
            Self::Defined(def) => Some(def),
        }
    }

    /// Options of the type itself (empty for primitives).
    pub fn options(&self) -> TypeOptions {
        match self {
            Self::Primitive(_) => TypeOptions::default(),
            Self::Defined(def) => def.options.clone(),
        }
    }
}

/// Immutable registry of declared types.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    package: String,
    roots: Vec<String>,
    types: BTreeMap<String, TypeDef>,
}

impl TypeCatalog {
    /// Load the SPDX v3 catalog shipped with this crate.
    pub fn spdx_v3() -> Result<Self, SchemaError> {
        Self::from_json(SPDX_V3_DESCRIPTION)
    }

    /// Load a catalog from its JSON description.
    ///
    /// Every type reference is checked; a dangling one is a [`SchemaError`].
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let doc: Json =
            serde_json::from_str(text).map_err(|e| SchemaError::Malformed(e.to_string()))?;

        let meta = doc.get("meta");
        let package = meta
            .and_then(|m| m.get("package"))
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();
        let roots = meta
            .and_then(|m| m.get("roots"))
            .and_then(Json::as_array)
            .map(|r| {
                r.iter()
                    .filter_map(Json::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let entries = doc
            .get("types")
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::Malformed("missing types array".into()))?;

        let mut types = BTreeMap::new();
        for entry in entries {
            let def = parse_type(entry)?;
            if types.contains_key(&def.name) {
                return Err(SchemaError::DuplicateType(def.name));
            }
            types.insert(def.name.clone(), def);
        }

        let catalog = Self {
            package,
            roots,
            types,
        };
        catalog.check_references()?;

        tracing::debug!(
            "loaded type catalog {} with {} types",
            catalog.package,
            catalog.types.len()
        );
        Ok(catalog)
    }

    /// Look up a declared type by name.
    pub fn type_of(&self, name: &str) -> Result<&TypeDef, SchemaError> {
        self.types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    /// Resolve a field's type reference: a declared type or a primitive.
    pub fn resolve(&self, type_ref: &str) -> Result<TypeShape<'_>, SchemaError> {
        if let Some(def) = self.types.get(type_ref) {
            return Ok(TypeShape::Defined(def));
        }
        match BaseType::parse(type_ref) {
            Some(base) if base.is_primitive() => Ok(TypeShape::Primitive(base)),
            _ => Err(SchemaError::UnknownType(type_ref.to_string())),
        }
    }

    /// Package IRI of the description.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Types intended as top-level documents.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Iterate all declared types in name order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    fn check_references(&self) -> Result<(), SchemaError> {
        for root in &self.roots {
            self.type_of(root)?;
        }
        for def in self.types.values() {
            for field in &def.fields {
                self.resolve(&field.type_ref)?;
            }
            match def.base {
                BaseType::MapOf => {
                    let key = def.options.key_type.as_deref().ok_or_else(|| {
                        SchemaError::InvalidOption {
                            type_name: def.name.clone(),
                            option: "+ (key type required)".into(),
                        }
                    })?;
                    self.resolve(key)?;
                    self.check_value_type(def)?;
                }
                BaseType::ArrayOf => self.check_value_type(def)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn check_value_type(&self, def: &TypeDef) -> Result<(), SchemaError> {
        let value = def
            .options
            .value_type
            .as_deref()
            .ok_or_else(|| SchemaError::InvalidOption {
                type_name: def.name.clone(),
                option: "* (value type required)".into(),
            })?;
        self.resolve(value).map(|_| ())
    }
}

fn parse_type(entry: &Json) -> Result<TypeDef, SchemaError> {
    let parts = entry
        .as_array()
        .ok_or_else(|| SchemaError::Malformed(format!("type entry is not an array: {}", entry)))?;
    let name = parts
        .first()
        .and_then(Json::as_str)
        .ok_or_else(|| SchemaError::Malformed("type entry without name".into()))?
        .to_string();
    let base_name = parts
        .get(1)
        .and_then(Json::as_str)
        .ok_or_else(|| SchemaError::Malformed(format!("type {} without base", name)))?;
    let base = BaseType::parse(base_name).ok_or_else(|| SchemaError::InvalidBase {
        type_name: name.clone(),
        base: base_name.to_string(),
    })?;
    let options = parse_options(&name, parts.get(2))?.0;
    let description = parts
        .get(3)
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();
    let items = parts.get(4).and_then(Json::as_array).cloned().unwrap_or_default();

    let mut fields = Vec::new();
    let mut enumerants = Vec::new();
    if base == BaseType::Enumerated {
        for item in &items {
            enumerants.push(parse_enumerant(&name, item)?);
        }
        check_unique(&name, enumerants.iter().map(|e| (e.code, e.name.as_str())))?;
    } else if base.has_fields() {
        for item in &items {
            fields.push(parse_field(&name, item)?);
        }
        check_unique(&name, fields.iter().map(|f| (f.ordinal, f.name.as_str())))?;
    } else if !items.is_empty() {
        return Err(SchemaError::Malformed(format!(
            "type {} ({}) cannot declare fields",
            name, base
        )));
    }

    Ok(TypeDef {
        name,
        base,
        options,
        description,
        fields,
        enumerants,
    })
}

fn parse_field(type_name: &str, item: &Json) -> Result<FieldDef, SchemaError> {
    let malformed = || SchemaError::Malformed(format!("type {}: bad field {}", type_name, item));
    let parts = item.as_array().ok_or_else(malformed)?;
    let ordinal = parts.first().and_then(Json::as_u64).ok_or_else(malformed)?;
    let name = parts.get(1).and_then(Json::as_str).ok_or_else(malformed)?;
    let type_ref = parts.get(2).and_then(Json::as_str).ok_or_else(malformed)?;
    let (options, min, max) = parse_options(type_name, parts.get(3))?;
    let description = parts.get(4).and_then(Json::as_str).unwrap_or_default();

    let min = min.unwrap_or(1);
    let max = match max {
        Some(0) => None,
        Some(n) => Some(n),
        None => Some(min.max(1)),
    };
    if let Some(max) = max {
        if max < min {
            return Err(SchemaError::InvalidOption {
                type_name: type_name.to_string(),
                option: format!("{}: max {} < min {}", name, max, min),
            });
        }
    }

    Ok(FieldDef {
        ordinal,
        name: name.to_string(),
        type_ref: type_ref.to_string(),
        min,
        max,
        options,
        description: description.to_string(),
    })
}

fn parse_enumerant(type_name: &str, item: &Json) -> Result<Enumerant, SchemaError> {
    let malformed =
        || SchemaError::Malformed(format!("type {}: bad enumerant {}", type_name, item));
    let parts = item.as_array().ok_or_else(malformed)?;
    Ok(Enumerant {
        code: parts.first().and_then(Json::as_u64).ok_or_else(malformed)?,
        name: parts
            .get(1)
            .and_then(Json::as_str)
            .ok_or_else(malformed)?
            .to_string(),
        description: parts
            .get(2)
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

type ParsedOptions = (TypeOptions, Option<u64>, Option<u64>);

fn parse_options(type_name: &str, raw: Option<&Json>) -> Result<ParsedOptions, SchemaError> {
    let mut options = TypeOptions::default();
    let mut min = None;
    let mut max = None;

    let Some(raw) = raw else {
        return Ok((options, min, max));
    };
    let list = raw
        .as_array()
        .ok_or_else(|| SchemaError::Malformed(format!("type {}: options must be an array", type_name)))?;

    for opt in list {
        let opt = opt.as_str().ok_or_else(|| SchemaError::InvalidOption {
            type_name: type_name.to_string(),
            option: opt.to_string(),
        })?;
        let invalid = || SchemaError::InvalidOption {
            type_name: type_name.to_string(),
            option: opt.to_string(),
        };
        let mut chars = opt.chars();
        let tag = chars.next().ok_or_else(invalid)?;
        let arg = chars.as_str();

        match tag {
            '[' => min = Some(arg.parse::<u64>().map_err(|_| invalid())?),
            ']' => max = Some(arg.parse::<u64>().map_err(|_| invalid())?),
            '{' => options.min_size = Some(arg.parse::<i64>().map_err(|_| invalid())?),
            '}' => options.max_size = Some(arg.parse::<i64>().map_err(|_| invalid())?),
            'q' if arg.is_empty() => options.unique = true,
            'K' if arg.is_empty() => options.key = true,
            'L' if arg.is_empty() => options.link = true,
            '/' => options.format = Some(Format::parse(arg).ok_or_else(invalid)?),
            '%' => {
                let anchored = format!("^(?:{})$", arg);
                let re = Regex::new(&anchored).map_err(|e| SchemaError::InvalidPattern {
                    type_name: type_name.to_string(),
                    message: e.to_string(),
                })?;
                options.pattern = Some(re);
            }
            '+' if !arg.is_empty() => options.key_type = Some(arg.to_string()),
            '*' if !arg.is_empty() => options.value_type = Some(arg.to_string()),
            _ => return Err(invalid()),
        }
    }

    Ok((options, min, max))
}

fn check_unique<'a>(
    type_name: &str,
    items: impl Iterator<Item = (u64, &'a str)>,
) -> Result<(), SchemaError> {
    let mut ordinals = HashSet::new();
    let mut names = HashSet::new();
    for (ordinal, name) in items {
        if !ordinals.insert(ordinal) || !names.insert(name) {
            return Err(SchemaError::DuplicateField {
                type_name: type_name.to_string(),
                field: name.to_string(),
            });
        }
    }
    Ok(())
}
