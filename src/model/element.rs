// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ModelError, ObjectKind, ParseTagError};
use super::ids::{ElementId, MemberId};
use crate::geometry::{Bounds, Point, Size};

/// Discriminator of the element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Class,
    Interface,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(Self::Class),
            "interface" => Ok(Self::Interface),
            other => Err(ParseTagError::new("element kind", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Attribute,
    Method,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberKind {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attribute" => Ok(Self::Attribute),
            "method" => Ok(Self::Method),
            other => Err(ParseTagError::new("member kind", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
    /// Package-private.
    Default,
}

impl AccessModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Default => "default",
        }
    }

    /// UML visibility glyph.
    pub fn glyph(self) -> char {
        match self {
            Self::Public => '+',
            Self::Private => '-',
            Self::Protected => '#',
            Self::Default => '~',
        }
    }
}

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessModifier {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "protected" => Ok(Self::Protected),
            "default" => Ok(Self::Default),
            other => Err(ParseTagError::new("access modifier", other)),
        }
    }
}

/// An attribute or method entry of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    id: MemberId,
    name: String,
    /// Empty means unspecified.
    type_annotation: String,
    access: AccessModifier,
}

impl Member {
    pub fn new(
        id: MemberId,
        name: impl Into<String>,
        type_annotation: impl Into<String>,
        access: AccessModifier,
    ) -> Self {
        Self { id, name: name.into(), type_annotation: type_annotation.into(), access }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_annotation(&self) -> &str {
        &self.type_annotation
    }

    pub fn access(&self) -> AccessModifier {
        self.access
    }

    pub fn apply_edit(&mut self, edit: MemberEdit) {
        match edit {
            MemberEdit::Name(name) => self.name = name,
            MemberEdit::TypeAnnotation(type_annotation) => self.type_annotation = type_annotation,
            MemberEdit::Access(access) => self.access = access,
        }
    }

    /// UML text form, e.g. `+ name: String`.
    pub fn notation(&self) -> String {
        if self.type_annotation.is_empty() {
            format!("{} {}", self.access.glyph(), self.name)
        } else {
            format!("{} {}: {}", self.access.glyph(), self.name, self.type_annotation)
        }
    }
}

/// A single-field member edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberEdit {
    Name(String),
    TypeAnnotation(String),
    Access(AccessModifier),
}

/// Variant-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementBody {
    Class { attributes: Vec<Member>, methods: Vec<Member> },
    Interface { methods: Vec<Member> },
}

/// A class or interface box on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: ElementId,
    name: String,
    bounds: Bounds,
    #[serde(flatten)]
    body: ElementBody,
}

impl Element {
    pub fn class(id: ElementId, name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id,
            name: name.into(),
            bounds,
            body: ElementBody::Class { attributes: Vec::new(), methods: Vec::new() },
        }
    }

    pub fn interface(id: ElementId, name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id,
            name: name.into(),
            bounds,
            body: ElementBody::Interface { methods: Vec::new() },
        }
    }

    pub fn with_members(mut self, kind: MemberKind, members: Vec<Member>) -> Result<Self, ModelError> {
        self.apply_patch(match kind {
            MemberKind::Attribute => ElementPatch { attributes: Some(members), ..ElementPatch::default() },
            MemberKind::Method => ElementPatch { methods: Some(members), ..ElementPatch::default() },
        })?;
        Ok(self)
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        match self.body {
            ElementBody::Class { .. } => ElementKind::Class,
            ElementBody::Interface { .. } => ElementKind::Interface,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn position(&self) -> Point {
        self.bounds.origin()
    }

    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    pub fn body(&self) -> &ElementBody {
        &self.body
    }

    /// Attribute list; always empty for interfaces.
    pub fn attributes(&self) -> &[Member] {
        match &self.body {
            ElementBody::Class { attributes, .. } => attributes,
            ElementBody::Interface { .. } => &[],
        }
    }

    pub fn methods(&self) -> &[Member] {
        match &self.body {
            ElementBody::Class { methods, .. } | ElementBody::Interface { methods } => methods,
        }
    }

    pub fn members(&self, kind: MemberKind) -> &[Member] {
        match kind {
            MemberKind::Attribute => self.attributes(),
            MemberKind::Method => self.methods(),
        }
    }

    /// All members, attributes first.
    pub fn all_members(&self) -> impl Iterator<Item = (MemberKind, &Member)> {
        self.attributes()
            .iter()
            .map(|m| (MemberKind::Attribute, m))
            .chain(self.methods().iter().map(|m| (MemberKind::Method, m)))
    }

    pub fn member(&self, member_id: &MemberId) -> Option<(MemberKind, &Member)> {
        self.all_members().find(|(_, m)| m.id() == member_id)
    }

    /// The list a member of `kind` is stored in, `None` when the variant has no
    /// such list.
    pub(crate) fn member_list_mut(&mut self, kind: MemberKind) -> Option<&mut Vec<Member>> {
        match (&mut self.body, kind) {
            (ElementBody::Class { attributes, .. }, MemberKind::Attribute) => Some(attributes),
            (ElementBody::Class { methods, .. }, MemberKind::Method)
            | (ElementBody::Interface { methods }, MemberKind::Method) => Some(methods),
            (ElementBody::Interface { .. }, MemberKind::Attribute) => None,
        }
    }

    /// The list a member edit is resolved against: attributes only for an
    /// attribute edit on a class, methods otherwise.
    pub(crate) fn edit_target_mut(&mut self, kind: MemberKind) -> &mut Vec<Member> {
        match &mut self.body {
            ElementBody::Class { attributes, .. } if kind == MemberKind::Attribute => attributes,
            ElementBody::Class { methods, .. } | ElementBody::Interface { methods } => methods,
        }
    }

    /// Merges `patch` into this element. Nothing changes when validation fails.
    pub fn apply_patch(&mut self, patch: ElementPatch) -> Result<(), ModelError> {
        if patch.attributes.is_some() && self.kind() == ElementKind::Interface {
            return Err(ModelError::NotApplicable { field: "attributes", kind: self.kind() });
        }
        if let Some(position) = patch.position {
            check_position(position)?;
        }
        if let Some(size) = patch.size {
            check_size(size)?;
        }
        let attributes = patch.attributes.as_deref().unwrap_or_else(|| self.attributes());
        let methods = patch.methods.as_deref().unwrap_or_else(|| self.methods());
        ensure_unique_member_ids(attributes.iter().chain(methods))?;

        let ElementPatch { name, position, size, attributes, methods } = patch;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(position) = position {
            self.bounds = self.bounds.with_origin(position);
        }
        if let Some(size) = size {
            self.bounds = self.bounds.with_size(size);
        }
        match &mut self.body {
            ElementBody::Class { attributes: current_attributes, methods: current_methods } => {
                if let Some(attributes) = attributes {
                    *current_attributes = attributes;
                }
                if let Some(methods) = methods {
                    *current_methods = methods;
                }
            }
            ElementBody::Interface { methods: current_methods } => {
                if let Some(methods) = methods {
                    *current_methods = methods;
                }
            }
        }
        Ok(())
    }
}

/// Rejects bounds that could not be stored and loaded back.
pub(crate) fn check_bounds(bounds: Bounds) -> Result<(), ModelError> {
    check_position(bounds.origin())?;
    check_size(bounds.size())
}

fn check_position(position: Point) -> Result<(), ModelError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidPosition { x: position.x(), y: position.y() })
    }
}

fn check_size(size: Size) -> Result<(), ModelError> {
    if size.is_positive() {
        Ok(())
    } else {
        Err(ModelError::InvalidSize { width: size.width(), height: size.height() })
    }
}

fn ensure_unique_member_ids<'a>(members: impl Iterator<Item = &'a Member>) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for member in members {
        if !seen.insert(member.id()) {
            return Err(ModelError::DuplicateId {
                kind: ObjectKind::Member,
                id: member.id().to_string(),
            });
        }
    }
    Ok(())
}

/// Partial update of an element. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub name: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub attributes: Option<Vec<Member>>,
    pub methods: Option<Vec<Member>>,
}

impl ElementPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn position(position: Point) -> Self {
        Self { position: Some(position), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
