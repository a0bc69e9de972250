#![forbid(unsafe_code)]

use crate::keys::KeyRange;

#[derive(Clone, Copy, Debug)]
pub struct PathEntry<'a> {
    pub range: KeyRange,
    pub name: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedPath {
    pub path: String,
    pub level: i64,
}

/// Derives the materialized path and level of every entry.
///
/// `entries` must be sorted by left key and properly nested. A single stack pass keeps the chain
/// of open ancestors; an ancestor is closed once an entry starts past its right key.
pub fn derive_paths(entries: &[PathEntry<'_>]) -> Vec<DerivedPath> {
    let mut out = Vec::with_capacity(entries.len());
    let mut open: Vec<(i64, usize)> = Vec::new();

    for entry in entries {
        while open
            .last()
            .is_some_and(|(right, _)| *right < entry.range.left())
        {
            open.pop();
        }

        let path = match open.last() {
            Some((_, parent)) => {
                let parent: &DerivedPath = &out[*parent];
                format!("{}/{}", parent.path, entry.name)
            }
            None => format!("/{}", entry.name),
        };
        let level = open.len() as i64 + 1;

        open.push((entry.range.right(), out.len()));
        out.push(DerivedPath { path, level });
    }

    out
}

#[cfg(test)]
mod tests;
