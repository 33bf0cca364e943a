//! Hierarchical document and collection paths.
//!
//! The store is organized as alternating collection and document segments:
//! `users` is a collection, `users/u1` a document, `users/u1/items` a nested
//! collection and `users/u1/items/shirt` a document inside it. Collection
//! paths therefore always have an odd number of segments and document paths
//! an even number.
//!
//! [`PathPattern`] matches document paths against templates such as
//! `users/{uid}/wearLogs/{logId}` and captures the wildcard segments, which is
//! how trigger events are routed to handlers.

use core::fmt;
use std::collections::BTreeMap;

/// Errors that can occur when building or parsing a path.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The input string is empty.
    #[error("path cannot be empty")]
    Empty,
    /// A segment is empty (leading, trailing or doubled `/`).
    #[error("path {path:?} contains an empty segment")]
    EmptySegment {
        /// The offending path.
        path: String,
    },
    /// A single segment contains a `/`.
    #[error("path segment {segment:?} must not contain '/'")]
    InvalidSegment {
        /// The offending segment.
        segment: String,
    },
    /// The path does not point at a collection.
    #[error("{path:?} is not a collection path (odd number of segments required)")]
    NotACollection {
        /// The offending path.
        path: String,
    },
    /// The path does not point at a document.
    #[error("{path:?} is not a document path (even number of segments required)")]
    NotADocument {
        /// The offending path.
        path: String,
    },
    /// A pattern wildcard is malformed.
    #[error("invalid pattern segment {segment:?}")]
    InvalidPattern {
        /// The offending pattern segment.
        segment: String,
    },
}

fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment {
            path: segment.to_owned(),
        });
    }
    if segment.contains('/') {
        return Err(PathError::InvalidSegment {
            segment: segment.to_owned(),
        });
    }
    Ok(())
}

fn split_path(path: &str) -> Result<Vec<String>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let segments: Vec<String> = path.split('/').map(str::to_owned).collect();
    if segments.iter().any(String::is_empty) {
        return Err(PathError::EmptySegment {
            path: path.to_owned(),
        });
    }
    Ok(segments)
}

/// Path to a collection, e.g. `users/u1/outfits`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// A top-level collection such as `users`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid segment.
    pub fn root(id: &str) -> Result<Self, PathError> {
        validate_segment(id)?;
        Ok(Self {
            segments: vec![id.to_owned()],
        })
    }

    /// Parse a slash-separated collection path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, has empty segments or has an
    /// even number of segments.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = split_path(path)?;
        if segments.len() % 2 == 0 {
            return Err(PathError::NotACollection {
                path: path.to_owned(),
            });
        }
        Ok(Self { segments })
    }

    /// The document with the given id inside this collection.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid segment.
    pub fn doc(&self, id: &str) -> Result<DocumentPath, PathError> {
        validate_segment(id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_owned());
        Ok(DocumentPath { segments })
    }

    /// The last segment (collection id), e.g. `outfits`.
    #[must_use]
    pub fn id(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The document this collection is nested under, if any.
    #[must_use]
    pub fn parent(&self) -> Option<DocumentPath> {
        let (_, rest) = self.segments.split_last()?;
        if rest.is_empty() {
            return None;
        }
        Some(DocumentPath {
            segments: rest.to_vec(),
        })
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Path to a single document, e.g. `users/u1/items/shirt`.
///
/// Ordering is segment-wise, so documents of the same collection sort by id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Parse a slash-separated document path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, has empty segments or has an
    /// odd number of segments.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = split_path(path)?;
        if segments.len() % 2 != 0 {
            return Err(PathError::NotADocument {
                path: path.to_owned(),
            });
        }
        Ok(Self { segments })
    }

    /// The document id (last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The collection containing this document.
    #[must_use]
    pub fn parent(&self) -> CollectionPath {
        let rest = self
            .segments
            .split_last()
            .map_or_else(Vec::new, |(_, rest)| rest.to_vec());
        CollectionPath { segments: rest }
    }

    /// A sub-collection nested under this document.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid segment.
    pub fn collection(&self, id: &str) -> Result<CollectionPath, PathError> {
        validate_segment(id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_owned());
        Ok(CollectionPath { segments })
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Param(String),
}

/// Document path template with `{name}` wildcards.
///
/// Each wildcard matches exactly one segment.
///
/// ```
/// use wardrobe_core::{DocumentPath, PathPattern};
///
/// let pattern = PathPattern::parse("users/{uid}/wearLogs/{logId}").unwrap();
/// let path = DocumentPath::parse("users/alice/wearLogs/log-1").unwrap();
/// let params = pattern.matches(&path).unwrap();
/// assert_eq!(params.get("uid"), Some("alice"));
/// assert_eq!(params.get("logId"), Some("log-1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error for empty segments or malformed wildcards such as
    /// `{}` or `{uid`.
    pub fn parse(pattern: &str) -> Result<Self, PathError> {
        let segments = split_path(pattern)?
            .into_iter()
            .map(|segment| {
                let param = segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'));
                match param {
                    Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
                        Ok(PatternSegment::Param(name.to_owned()))
                    }
                    None if !segment.contains(['{', '}']) => Ok(PatternSegment::Literal(segment)),
                    _ => Err(PathError::InvalidPattern { segment }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: pattern.to_owned(),
            segments,
        })
    }

    /// Match a document path, capturing wildcard segments.
    #[must_use]
    pub fn matches(&self, path: &DocumentPath) -> Option<PathParams> {
        if self.segments.len() != path.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (pattern, actual) in self.segments.iter().zip(&path.segments) {
            match pattern {
                PatternSegment::Literal(literal) if literal == actual => {}
                PatternSegment::Literal(_) => return None,
                PatternSegment::Param(name) => {
                    params.insert(name.clone(), actual.clone());
                }
            }
        }
        Some(PathParams(params))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Wildcard values captured by [`PathPattern::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    /// Value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}
