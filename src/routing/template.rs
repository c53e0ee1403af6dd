//! Route path templates.
//!
//! A template is a `/`-delimited path whose segments are either literals or
//! whole-segment parameters written as `<name>`:
//!
//! ```text
//! /users/<user_id>/orders/<order_id>
//! ```
//!
//! There are no wildcards, optional segments or regexes. Matching is
//! case-sensitive and trailing slashes are significant.

use crate::error::{ResolverError, Result};

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Matches any non-empty request segment and binds it to the name.
    Param(String),
}

/// Parameters bound by a successful match, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Get the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PathParams(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A compiled route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Compile a template string.
    ///
    /// Fails when the template does not start with `/`, when a segment mixes
    /// `<`/`>` with other text, when a parameter name is not an identifier,
    /// or when a parameter name repeats.
    pub fn compile(template: &str) -> Result<Self> {
        let invalid = |reason: String| ResolverError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        if !template.starts_with('/') {
            return Err(invalid("must start with '/'".to_string()));
        }

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for raw in template.split('/') {
            if let Some(name) = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                if !is_identifier(name) {
                    return Err(invalid(format!("malformed parameter '{}'", raw)));
                }
                if names.contains(&name) {
                    return Err(invalid(format!("duplicate parameter '{}'", name)));
                }
                names.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else if raw.contains('<') || raw.contains('>') {
                return Err(invalid(format!(
                    "parameter must span a whole segment, got '{}'",
                    raw
                )));
            } else {
                segments.push(Segment::Literal(raw.to_string()));
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Match a request path, returning the bound parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut candidate = path.split('/');
        let mut params = Vec::new();

        for segment in &self.segments {
            let value = candidate.next()?;
            match segment {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if value.is_empty() => return None,
                Segment::Param(name) => params.push((name.clone(), value.to_string())),
            }
        }

        if candidate.next().is_some() {
            return None;
        }
        Some(PathParams(params))
    }

    /// The template as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compiled segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

impl std::fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let template = RouteTemplate::compile("/api/users").unwrap();

        assert!(template.matches("/api/users").is_some());
        assert!(template.matches("/api/Users").is_none());
        assert!(template.matches("/api/users/1").is_none());
        assert!(template.matches("/api").is_none());
    }

    #[test]
    fn test_param_binding_in_template_order() {
        let template = RouteTemplate::compile("/<name>/<my_id>").unwrap();
        let params = template.matches("/my/path").unwrap();

        assert_eq!(params.get("name"), Some("my"));
        assert_eq!(params.get("my_id"), Some("path"));
        let names: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["name", "my_id"]);
    }

    #[test]
    fn test_param_requires_non_empty_segment() {
        let template = RouteTemplate::compile("/hello/<name>").unwrap();

        assert!(template.matches("/hello/").is_none());
        assert_eq!(
            template.matches("/hello/lessa").unwrap().get("name"),
            Some("lessa")
        );
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let bare = RouteTemplate::compile("/hello").unwrap();
        let slashed = RouteTemplate::compile("/hello/").unwrap();

        assert!(bare.matches("/hello/").is_none());
        assert!(slashed.matches("/hello").is_none());
        assert!(slashed.matches("/hello/").is_some());
    }

    #[test]
    fn test_param_values_keep_special_characters() {
        let template = RouteTemplate::compile("/files/<name>").unwrap();
        let params = template.matches("/files/report-2024.v2.pdf").unwrap();

        assert_eq!(params.get("name"), Some("report-2024.v2.pdf"));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let err = RouteTemplate::compile("/<id>/child/<id>").unwrap_err();

        assert!(matches!(err, ResolverError::InvalidTemplate { .. }));
        assert!(err.to_string().contains("duplicate parameter 'id'"));
    }

    #[test]
    fn test_malformed_templates_rejected() {
        for template in ["hello", "/<>", "/<1abc>", "/user-<id>", "/<id", "/<na me>"] {
            assert!(
                RouteTemplate::compile(template).is_err(),
                "expected '{}' to be rejected",
                template
            );
        }
    }

    #[test]
    fn test_root_template() {
        let template = RouteTemplate::compile("/").unwrap();

        assert!(template.matches("/").is_some());
        assert!(template.matches("/a").is_none());
        assert_eq!(template.param_names().count(), 0);
    }
}
