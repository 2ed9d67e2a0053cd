//! Elements: the immutable, globally identified nodes of the graph.
//!
//! The type discriminant is a closed enum, [`ElementType`]. Shared field shapes
//! are expressed with the capability traits [`IsIdentity`], [`IsCollection`]
//! and [`IsArtifact`] instead of an inheritance hierarchy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::iri::Iri;
use crate::path::FieldPath;
use crate::types::{
    ExternalIdentifier, ExternalMap, ExternalReference, IntegrityMethod, ProfileIdentifier,
    Timestamp,
};

// ───────────────────────────────────────────────────────────────────────────
// Element
// ───────────────────────────────────────────────────────────────────────────

/// A single graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: Iri,

    #[serde(rename = "type")]
    pub element_type: ElementType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    // Provenance, defaulted from the Payload when absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creator: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<ProfileIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_license: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verified_using: Vec<IntegrityMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<ExternalReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_identifiers: Vec<ExternalIdentifier>,

    /// Open IRI-keyed properties carried opaquely.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl Element {
    /// Create an Element with only an id and a type.
    pub fn new(id: impl Into<Iri>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            name: None,
            summary: None,
            description: None,
            comment: None,
            creator: Vec::new(),
            created: None,
            spec_version: None,
            profile: Vec::new(),
            data_license: None,
            verified_using: Vec::new(),
            external_references: Vec::new(),
            external_identifiers: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_created(mut self, created: Timestamp) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_creator(mut self, creator: impl Into<Iri>) -> Self {
        self.creator.push(creator.into());
        self
    }

    pub fn with_verified_using(mut self, method: IntegrityMethod) -> Self {
        self.verified_using.push(method);
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.element_type.kind()
    }

    /// Every Link held by this Element, with the path of the field holding it.
    pub fn links(&self) -> Vec<(FieldPath, &Iri)> {
        let mut out = Vec::new();
        let root = FieldPath::root();
        push_all(&mut out, &root.field("creator"), &self.creator);

        let base = root.field("type").field(self.kind().as_str());
        match &self.element_type {
            ElementType::Annotation(a) => out.push((base.field("subject"), &a.subject)),
            ElementType::Relationship(r) => {
                out.push((base.field("from"), &r.from));
                push_all(&mut out, &base.field("to"), &r.to);
            }
            ElementType::Identity(_)
            | ElementType::Person(_)
            | ElementType::Organization(_)
            | ElementType::Process(_)
            | ElementType::License(_) => {}
            ElementType::SpdxDocument(d) => {
                push_all(&mut out, &base.field("element"), &d.element);
                push_all(&mut out, &base.field("rootElement"), &d.root_element);
                push_imports(&mut out, &base.field("import"), &d.import);
                push_all(&mut out, &base.field("documentRef"), &d.document_ref);
            }
            ElementType::Bom(c) | ElementType::Sbom(c) => {
                push_all(&mut out, &base.field("element"), &c.element);
                push_all(&mut out, &base.field("rootElement"), &c.root_element);
                push_imports(&mut out, &base.field("import"), &c.import);
            }
            ElementType::Package(p) => push_all(&mut out, &base.field("originator"), &p.originator),
            ElementType::File(f) => push_all(&mut out, &base.field("originator"), &f.originator),
            ElementType::Snippet(s) => {
                push_all(&mut out, &base.field("originator"), &s.originator);
                out.push((base.field("snippetFromFile"), &s.snippet_from_file));
            }
        }
        out
    }

    /// Rewrite the id and every Link through `f`.
    ///
    /// Stops at the first error; the Element may then be partially rewritten.
    pub fn map_ids<E>(&mut self, mut f: impl FnMut(&Iri) -> Result<Iri, E>) -> Result<(), E> {
        self.id = f(&self.id)?;
        for link in self.links_mut() {
            *link = f(link)?;
        }
        Ok(())
    }

    fn links_mut(&mut self) -> Vec<&mut Iri> {
        let mut out: Vec<&mut Iri> = self.creator.iter_mut().collect();
        match &mut self.element_type {
            ElementType::Annotation(a) => out.push(&mut a.subject),
            ElementType::Relationship(r) => {
                out.push(&mut r.from);
                out.extend(r.to.iter_mut());
            }
            ElementType::Identity(_)
            | ElementType::Person(_)
            | ElementType::Organization(_)
            | ElementType::Process(_)
            | ElementType::License(_) => {}
            ElementType::SpdxDocument(d) => {
                out.extend(d.element.iter_mut());
                out.extend(d.root_element.iter_mut());
                out.extend(d.import.iter_mut().map(|m| &mut m.external_id));
                out.extend(d.document_ref.iter_mut());
            }
            ElementType::Bom(c) | ElementType::Sbom(c) => {
                out.extend(c.element.iter_mut());
                out.extend(c.root_element.iter_mut());
                out.extend(c.import.iter_mut().map(|m| &mut m.external_id));
            }
            ElementType::Package(p) => out.extend(p.originator.iter_mut()),
            ElementType::File(f) => out.extend(f.originator.iter_mut()),
            ElementType::Snippet(s) => {
                out.extend(s.originator.iter_mut());
                out.push(&mut s.snippet_from_file);
            }
        }
        out
    }
}

fn push_all<'a>(out: &mut Vec<(FieldPath, &'a Iri)>, path: &FieldPath, iris: &'a [Iri]) {
    for (i, iri) in iris.iter().enumerate() {
        out.push((path.index(i), iri));
    }
}

fn push_imports<'a>(out: &mut Vec<(FieldPath, &'a Iri)>, path: &FieldPath, maps: &'a [ExternalMap]) {
    for (i, map) in maps.iter().enumerate() {
        out.push((path.index(i).field("externalId"), &map.external_id));
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Type discriminant
// ───────────────────────────────────────────────────────────────────────────

/// Type discriminant and type-specific properties, serialized as a Choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Annotation(Annotation),
    Relationship(Relationship),
    Identity(IdentityInfo),
    Person(IdentityInfo),
    Organization(IdentityInfo),
    Process(IdentityInfo),
    SpdxDocument(SpdxDocument),
    Bom(Collection),
    Sbom(Collection),
    Package(Package),
    File(File),
    Snippet(Snippet),
    License(License),
}

impl ElementType {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Annotation(_) => ElementKind::Annotation,
            Self::Relationship(_) => ElementKind::Relationship,
            Self::Identity(_) => ElementKind::Identity,
            Self::Person(_) => ElementKind::Person,
            Self::Organization(_) => ElementKind::Organization,
            Self::Process(_) => ElementKind::Process,
            Self::SpdxDocument(_) => ElementKind::SpdxDocument,
            Self::Bom(_) => ElementKind::Bom,
            Self::Sbom(_) => ElementKind::Sbom,
            Self::Package(_) => ElementKind::Package,
            Self::File(_) => ElementKind::File,
            Self::Snippet(_) => ElementKind::Snippet,
            Self::License(_) => ElementKind::License,
        }
    }

    pub fn as_identity(&self) -> Option<&dyn IsIdentity> {
        match self {
            Self::Identity(i) | Self::Person(i) | Self::Organization(i) | Self::Process(i) => {
                Some(i)
            }
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&dyn IsCollection> {
        match self {
            Self::SpdxDocument(d) => Some(d),
            Self::Bom(c) | Self::Sbom(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_artifact(&self) -> Option<&dyn IsArtifact> {
        match self {
            Self::Package(p) => Some(p),
            Self::File(f) => Some(f),
            Self::Snippet(s) => Some(s),
            _ => None,
        }
    }
}

/// Fieldless mirror of [`ElementType`], named by Choice tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    Annotation,
    Relationship,
    Identity,
    Person,
    Organization,
    Process,
    SpdxDocument,
    Bom,
    Sbom,
    Package,
    File,
    Snippet,
    License,
}

impl ElementKind {
    pub const ALL: [ElementKind; 13] = [
        Self::Annotation,
        Self::Relationship,
        Self::Identity,
        Self::Person,
        Self::Organization,
        Self::Process,
        Self::SpdxDocument,
        Self::Bom,
        Self::Sbom,
        Self::Package,
        Self::File,
        Self::Snippet,
        Self::License,
    ];

    /// Choice tag of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annotation => "annotation",
            Self::Relationship => "relationship",
            Self::Identity => "identity",
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Process => "process",
            Self::SpdxDocument => "spdxDocument",
            Self::Bom => "bom",
            Self::Sbom => "sbom",
            Self::Package => "package",
            Self::File => "file",
            Self::Snippet => "snippet",
            Self::License => "license",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }

    pub const fn is_identity(self) -> bool {
        matches!(
            self,
            Self::Identity | Self::Person | Self::Organization | Self::Process
        )
    }

    pub const fn is_collection(self) -> bool {
        matches!(self, Self::SpdxDocument | Self::Bom | Self::Sbom)
    }

    /// Artifacts are the only kinds for which `verifiedUsing` is meaningful.
    pub const fn is_artifact(self) -> bool {
        matches!(self, Self::Package | Self::File | Self::Snippet)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Capabilities
// ───────────────────────────────────────────────────────────────────────────

/// Actors identified by one or more external identifiers.
pub trait IsIdentity {
    fn identified_by(&self) -> &[ExternalIdentifier];
    fn email(&self) -> Option<&str>;
}

/// Elements enumerating other Elements.
pub trait IsCollection {
    fn members(&self) -> &[Iri];
    fn roots(&self) -> &[Iri];
    fn imports(&self) -> &[ExternalMap];
}

/// Elements describing artifacts.
pub trait IsArtifact {
    fn originators(&self) -> &[Iri];
}

// ───────────────────────────────────────────────────────────────────────────
// Variant payloads
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationType {
    Review,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub annotation_type: AnnotationType,
    pub subject: Iri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    Describes,
    DescribedBy,
    Contains,
    ContainedBy,
    DependsOn,
    DependencyOf,
    Generates,
    GeneratedFrom,
    AncestorOf,
    DescendantOf,
    VariantOf,
    DistributionArtifact,
    PatchFor,
    CopyOf,
    ExpandedFromArchive,
    DynamicLink,
    StaticLink,
    DataFile,
    TestCaseOf,
    BuildToolOf,
    DevToolOf,
    MetafileOf,
    Amends,
    PrerequisiteFor,
    HasPrerequisite,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipCompleteness {
    Complete,
    Incomplete,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub from: Iri,
    #[serde(default)]
    pub to: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<RelationshipCompleteness>,
}

/// Shared shape of Identity, Person, Organization and Process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfo {
    #[serde(default)]
    pub identified_by: Vec<ExternalIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl IsIdentity for IdentityInfo {
    fn identified_by(&self) -> &[ExternalIdentifier] {
        &self.identified_by
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxDocument {
    #[serde(default)]
    pub element: Vec<Iri>,
    #[serde(default)]
    pub root_element: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub import: Vec<ExternalMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Iri>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace_map: BTreeMap<String, Iri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_ref: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
}

impl IsCollection for SpdxDocument {
    fn members(&self) -> &[Iri] {
        &self.element
    }

    fn roots(&self) -> &[Iri] {
        &self.root_element
    }

    fn imports(&self) -> &[ExternalMap] {
        &self.import
    }
}

/// Shared shape of Bom and Sbom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default)]
    pub element: Vec<Iri>,
    #[serde(default)]
    pub root_element: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub import: Vec<ExternalMap>,
}

impl IsCollection for Collection {
    fn members(&self) -> &[Iri] {
        &self.element
    }

    fn roots(&self) -> &[Iri] {
        &self.root_element
    }

    fn imports(&self) -> &[ExternalMap] {
        &self.import
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originator: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
}

impl IsArtifact for Package {
    fn originators(&self) -> &[Iri] {
        &self.originator
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originator: Vec<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl IsArtifact for File {
    fn originators(&self) -> &[Iri] {
        &self.originator
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originator: Vec<Iri>,
    pub snippet_from_file: Iri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_range: Option<PositiveRange>,
}

impl IsArtifact for Snippet {
    fn originators(&self) -> &[Iri] {
        &self.originator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositiveRange {
    pub begin: u64,
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub license_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_text: Option<String>,
}
