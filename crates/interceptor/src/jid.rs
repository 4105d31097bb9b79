//! Chat addresses and their bare form.
//!
//! An address has the shape `[node@]domain[/resource]`. The *bare* form drops
//! the resource, so `alice@example.com/phone` and `alice@example.com/laptop`
//! compare equal once reduced with [`Jid::to_bare`].
//!
//! Node and domain are case-insensitive and stored lowercased; the resource
//! is case-sensitive and kept verbatim.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::JidError;

/// A full chat address, optionally qualified by a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Jid {
    node: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// Parses an address string.
    pub fn parse(input: &str) -> Result<Self, JidError> {
        if input.is_empty() {
            return Err(JidError::Empty);
        }

        // The resource may itself contain '@' and '/', so split on the first '/'
        // before looking for the node separator.
        let (bare, resource) = match input.split_once('/') {
            Some((_, "")) => return Err(JidError::EmptyResource(input.to_string())),
            Some((bare, resource)) => (bare, Some(resource.to_string())),
            None => (input, None),
        };

        let (node, domain) = match bare.split_once('@') {
            Some(("", _)) => return Err(JidError::EmptyNode(input.to_string())),
            Some((node, domain)) => (Some(node.to_lowercase()), domain),
            None => (None, bare),
        };

        if domain.is_empty() {
            return Err(JidError::EmptyDomain(input.to_string()));
        }

        Ok(Self {
            node,
            domain: domain.to_lowercase(),
            resource,
        })
    }

    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Returns this address without its resource.
    pub fn to_bare(&self) -> BareJid {
        BareJid {
            node: self.node.clone(),
            domain: self.domain.clone(),
        }
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Jid {
    type Error = JidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Jid> for String {
    fn from(jid: Jid) -> Self {
        jid.to_string()
    }
}

impl std::fmt::Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(node) = &self.node {
            write!(f, "{node}@")?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// An address reduced to its logical identity (`node@domain` or `domain`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct BareJid {
    node: Option<String>,
    domain: String,
}

impl From<BareJid> for String {
    fn from(jid: BareJid) -> Self {
        jid.to_string()
    }
}

impl std::fmt::Display for BareJid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node {
            Some(node) => write!(f, "{node}@{}", self.domain),
            None => write!(f, "{}", self.domain),
        }
    }
}
