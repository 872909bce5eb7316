//! Line-level tokenisation shared by every reader.

use std::io::BufRead;

use crate::errors::EdgeListProviderError;

/// A non-blank, non-comment line with its one-based line number.
pub(crate) struct Record {
    pub(crate) line: usize,
    pub(crate) content: String,
}

/// Yields the meaningful lines of `reader`, skipping blank lines and lines
/// starting with `#`.
pub(crate) fn records<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<Record, EdgeListProviderError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(content) => {
                let trimmed = content.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('#')).then(|| {
                    Ok(Record {
                        line: index + 1,
                        content: trimmed.to_owned(),
                    })
                })
            }
            Err(error) => Some(Err(error.into())),
        })
}

impl Record {
    /// Parses every token of the record as a non-negative integer.
    pub(crate) fn indices<T: std::str::FromStr<Err = std::num::ParseIntError>>(
        &self,
    ) -> Result<Vec<T>, EdgeListProviderError> {
        self.content
            .split(['\t', ' '])
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<T>()
                    .map_err(|source| EdgeListProviderError::InvalidIndex {
                        line: self.line,
                        token: token.to_owned(),
                        source,
                    })
            })
            .collect()
    }

    /// Parses a record holding exactly two indices.
    pub(crate) fn pair<T>(&self) -> Result<(T, T), EdgeListProviderError>
    where
        T: std::str::FromStr<Err = std::num::ParseIntError> + Copy,
    {
        match self.indices::<T>()?.as_slice() {
            &[first, second] => Ok((first, second)),
            _ => Err(EdgeListProviderError::MalformedRecord {
                line: self.line,
                content: self.content.clone(),
            }),
        }
    }
}
