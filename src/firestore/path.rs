use super::FirestoreError;

/// A document path pattern such as `markers/{markerId}`.
///
/// Literal segments must match exactly; `{name}` segments capture one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(String),
}

impl DocumentPattern {
    pub fn parse(pattern: &str) -> Result<Self, FirestoreError> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(FirestoreError::InvalidPattern(pattern.to_string()));
        }

        let mut segments = Vec::new();
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(FirestoreError::InvalidPattern(pattern.to_string()));
            }
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
                    Segment::Wildcard(name.to_string())
                }
                Some(_) => return Err(FirestoreError::InvalidPattern(pattern.to_string())),
                None if part.contains(['{', '}']) => {
                    return Err(FirestoreError::InvalidPattern(pattern.to_string()))
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        // Documents live at an even depth: collection/doc[/collection/doc...]
        if segments.len() % 2 != 0 {
            return Err(FirestoreError::InvalidPattern(pattern.to_string()));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches a document path relative to the database root and returns the
    /// captured parameters in pattern order.
    pub fn capture(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Wildcard(_) if part.is_empty() => return None,
                Segment::Wildcard(name) => params.push((name.clone(), part.to_string())),
            }
        }
        Some(params)
    }

    /// The value captured by the last wildcard, i.e. the document id for
    /// patterns ending in `{id}`.
    pub fn document_id(&self, path: &str) -> Option<String> {
        self.capture(path)?.pop().map(|(_, value)| value)
    }
}

/// Strips `projects/{p}/databases/{d}/documents/` from a full resource name.
pub fn relative_document_path(name: &str) -> &str {
    match name.find("/documents/") {
        Some(idx) => &name[idx + "/documents/".len()..],
        None => name.trim_start_matches("documents/"),
    }
}
