//! Locations of matched values.
//!
//! Every match remembers how it was reached from the document root. Rather
//! than copying a full path for every node a query visits, locations are kept
//! in a per-evaluation arena of parent links; a `NormalizedPath` is only built
//! when a caller asks for it.

use super::ast::quote_name;
use std::fmt;

/// One step from a container to a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathElement<'a> {
    Key(&'a str),
    Index(usize),
}

/// Handle to an entry in a `Trail`.
pub(crate) type LocationId = usize;

struct Link<'a> {
    parent: LocationId,
    element: PathElement<'a>,
}

/// Arena of parent links. Entry 0 is the document root.
pub(crate) struct Trail<'a> {
    links: Vec<Option<Link<'a>>>,
}

impl<'a> Trail<'a> {
    pub(crate) const ROOT: LocationId = 0;

    pub(crate) fn new() -> Self {
        Self { links: vec![None] }
    }

    /// Records that `element` was reached from `parent`.
    pub(crate) fn push(&mut self, parent: LocationId, element: PathElement<'a>) -> LocationId {
        self.links.push(Some(Link { parent, element }));
        self.links.len() - 1
    }

    pub(crate) fn resolve(&self, mut id: LocationId) -> NormalizedPath<'a> {
        let mut elements = Vec::new();
        while let Some(Some(link)) = self.links.get(id) {
            elements.push(link.element);
            id = link.parent;
        }
        elements.reverse();
        NormalizedPath { elements }
    }
}

/// The location of a match, e.g. `$['store']['book'][0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath<'a> {
    elements: Vec<PathElement<'a>>,
}

impl<'a> NormalizedPath<'a> {
    pub fn elements(&self) -> &[PathElement<'a>] {
        &self.elements
    }

    /// True for the location of the document root itself.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for NormalizedPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for element in &self.elements {
            match element {
                PathElement::Index(i) => write!(f, "[{}]", i)?,
                PathElement::Key(key) => write!(f, "[{}]", quote_name(key))?,
            }
        }
        Ok(())
    }
}
