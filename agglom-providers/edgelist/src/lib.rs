//! Edge-list provider: reads tab-separated graph and ground-truth text into
//! validated [`EdgeList`] and [`GroundTruth`] values.
//!
//! The graph format starts with a `vertices<TAB>edges` header record followed
//! by one `from<TAB>to` record per edge, with zero-based indices. The header
//! may instead live in a separate vertex file, whose later records map each
//! vertex to the id it had in the source dataset. Blank lines and lines
//! starting with `#` are ignored everywhere.

mod errors;
mod records;

use std::io::BufRead;

use agglom_core::{DeclaredCounts, EdgeList, GroundTruth};
use tracing::{debug, instrument};

pub use crate::errors::EdgeListProviderError;
use crate::records::{Record, records};

/// A named, checksum-validated edge list.
#[derive(Clone, Debug)]
pub struct EdgeListSource {
    name: String,
    edges: EdgeList,
    original_ids: Vec<Option<u64>>,
}

impl EdgeListSource {
    /// Reads a header record followed by edge records from one reader.
    ///
    /// # Errors
    /// Returns [`EdgeListProviderError::MissingHeader`] for input without a
    /// header, a parse error for malformed records, and
    /// [`EdgeListProviderError::Input`] when the loaded counts disagree with
    /// the header or the edges are not simple.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use agglom_providers_edgelist::EdgeListSource;
    ///
    /// let text = "3\t2\n0\t1\n1\t2\n";
    /// let source = EdgeListSource::try_from_reader("path", Cursor::new(text))
    ///     .expect("edge list must parse");
    /// assert_eq!(source.edges().vertex_count(), 3);
    /// assert_eq!(source.edges().edge_count(), 2);
    /// ```
    #[instrument(
        name = "provider.edgelist.read",
        err,
        skip(name, reader),
        fields(name = %name.as_ref()),
    )]
    pub fn try_from_reader<R: BufRead>(
        name: impl AsRef<str>,
        reader: R,
    ) -> Result<Self, EdgeListProviderError> {
        let mut lines = records(reader);
        let header = lines
            .next()
            .transpose()?
            .ok_or(EdgeListProviderError::MissingHeader)?;
        let declared = declared_counts(&header)?;
        let edges = collect_edges(lines)?;
        Self::validate(name.as_ref(), declared, edges, Vec::new())
    }

    /// Reads the header and optional original-id records from `vertices` and
    /// the edge records from `edges`.
    ///
    /// # Errors
    /// As [`Self::try_from_reader`], plus
    /// [`EdgeListProviderError::DuplicateMapping`] when a vertex is mapped
    /// twice.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use agglom_providers_edgelist::EdgeListSource;
    ///
    /// let source = EdgeListSource::try_from_parts(
    ///     "split",
    ///     Cursor::new("2\t1\n0\t1001\n1\t1002\n"),
    ///     Cursor::new("0\t1\n"),
    /// )
    /// .expect("edge list must parse");
    /// assert_eq!(source.original_id(1), Some(1002));
    /// ```
    #[instrument(
        name = "provider.edgelist.read_parts",
        err,
        skip(name, vertices, edges),
        fields(name = %name.as_ref()),
    )]
    pub fn try_from_parts<V: BufRead, E: BufRead>(
        name: impl AsRef<str>,
        vertices: V,
        edges: E,
    ) -> Result<Self, EdgeListProviderError> {
        let mut vertex_lines = records(vertices);
        let header = vertex_lines
            .next()
            .transpose()?
            .ok_or(EdgeListProviderError::MissingHeader)?;
        let declared = declared_counts(&header)?;

        let mut original_ids = Vec::new();
        for record in vertex_lines {
            let record = record?;
            let (vertex, original) = record.pair::<u64>()?;
            let vertex = usize::try_from(vertex)
                .ok()
                .filter(|&vertex| vertex < declared.vertices)
                .ok_or_else(|| EdgeListProviderError::MalformedRecord {
                    line: record.line,
                    content: record.content.clone(),
                })?;
            if original_ids.len() <= vertex {
                original_ids.resize(vertex + 1, None);
            }
            match original_ids.get_mut(vertex) {
                Some(Some(existing)) => {
                    return Err(EdgeListProviderError::DuplicateMapping {
                        line: record.line,
                        vertex,
                        original: *existing,
                    });
                }
                Some(slot) => *slot = Some(original),
                None => {}
            }
        }

        let edges = collect_edges(records(edges))?;
        Self::validate(name.as_ref(), declared, edges, original_ids)
    }

    fn validate(
        name: &str,
        declared: DeclaredCounts,
        edges: Vec<(usize, usize)>,
        original_ids: Vec<Option<u64>>,
    ) -> Result<Self, EdgeListProviderError> {
        let edges = EdgeList::from_declared(declared, edges)?;
        debug!(
            vertices = edges.vertex_count(),
            edges = edges.edge_count(),
            mapped = original_ids.iter().flatten().count(),
            "edge list loaded"
        );
        Ok(Self {
            name: name.to_owned(),
            edges,
            original_ids,
        })
    }

    /// Display name, usually the file the edges came from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated edge list.
    #[must_use]
    pub fn edges(&self) -> &EdgeList {
        &self.edges
    }

    /// Consumes the source, returning the edge list.
    #[must_use]
    pub fn into_edges(self) -> EdgeList {
        self.edges
    }

    /// Id the vertex had in the source dataset, when a vertex file mapped it.
    #[must_use]
    pub fn original_id(&self, vertex: usize) -> Option<u64> {
        self.original_ids.get(vertex).copied().flatten()
    }

    /// Original ids indexed by vertex; empty when no vertex file was read.
    #[must_use]
    pub fn original_ids(&self) -> &[Option<u64>] {
        &self.original_ids
    }
}

/// Reads one community per record, as tab-separated vertex indices, and
/// validates them against `vertex_count`.
///
/// # Errors
/// Returns a parse error for non-numeric tokens and
/// [`EdgeListProviderError::Input`] for indices outside the graph.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use agglom_providers_edgelist::read_ground_truth;
///
/// let truth = read_ground_truth(Cursor::new("0\t1\t2\n# tail\n3\t4\n"), 5)
///     .expect("truth must parse");
/// assert_eq!(truth.communities(), &[vec![0, 1, 2], vec![3, 4]]);
/// ```
pub fn read_ground_truth<R: BufRead>(
    reader: R,
    vertex_count: usize,
) -> Result<GroundTruth, EdgeListProviderError> {
    let communities = records(reader)
        .map(|record| record.and_then(|record| record.indices::<usize>()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GroundTruth::new(vertex_count, communities)?)
}

fn declared_counts(header: &Record) -> Result<DeclaredCounts, EdgeListProviderError> {
    let (vertices, edges) = header.pair::<usize>()?;
    Ok(DeclaredCounts { vertices, edges })
}

fn collect_edges(
    lines: impl Iterator<Item = Result<Record, EdgeListProviderError>>,
) -> Result<Vec<(usize, usize)>, EdgeListProviderError> {
    lines
        .map(|record| record.and_then(|record| record.pair::<usize>()))
        .collect()
}
