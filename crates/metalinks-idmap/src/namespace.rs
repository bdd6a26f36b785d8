//! Identifier namespaces and a fixed-size per-namespace container.

use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One of the chemical identifier systems reconciled across source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Chebi,
    Kegg,
    Hmdb,
    Pubchem,
}

impl Namespace {
    /// All namespaces, in anchor schedule order.
    pub const ALL: [Namespace; 4] = [
        Namespace::Chebi,
        Namespace::Kegg,
        Namespace::Hmdb,
        Namespace::Pubchem,
    ];

    fn slot(self) -> usize {
        match self {
            Namespace::Chebi => 0,
            Namespace::Kegg => 1,
            Namespace::Hmdb => 2,
            Namespace::Pubchem => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Namespace::Chebi => "chebi",
            Namespace::Kegg => "kegg",
            Namespace::Hmdb => "hmdb",
            Namespace::Pubchem => "pubchem",
        }
    }

    /// The three namespaces other than `self`, in schedule order.
    pub fn others(self) -> impl Iterator<Item = Namespace> {
        Self::ALL.into_iter().filter(move |ns| *ns != self)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Namespace {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chebi" => Ok(Namespace::Chebi),
            "kegg" => Ok(Namespace::Kegg),
            "hmdb" => Ok(Namespace::Hmdb),
            "pubchem" | "cid" => Ok(Namespace::Pubchem),
            _ => Err(ReconcileError::UnknownNamespace(s.to_string())),
        }
    }
}

/// A value per namespace, indexed by [`Namespace`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceMap<T>([T; 4]);

impl<T> NamespaceMap<T> {
    pub fn from_fn(mut f: impl FnMut(Namespace) -> T) -> Self {
        Self(Namespace::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Namespace, &T)> {
        Namespace::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Namespace> for NamespaceMap<T> {
    type Output = T;

    fn index(&self, ns: Namespace) -> &T {
        &self.0[ns.slot()]
    }
}

impl<T> IndexMut<Namespace> for NamespaceMap<T> {
    fn index_mut(&mut self, ns: Namespace) -> &mut T {
        &mut self.0[ns.slot()]
    }
}
