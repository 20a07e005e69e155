//! Session identity bootstrap
//!
//! A session is an opaque string scoping a corpus and its conversations.
//! The identifier travels in the backend resume URL as a `session` query
//! parameter, so rerunning with that URL (or sharing it) resumes the same
//! session. Resolution order: explicit CLI value, then the URL parameter,
//! then a freshly generated UUID written back into the resume URL.
//!
//! [`establish`] is guarded by a process-wide cell: exactly one identifier
//! is established per process lifetime, and re-invocation returns the first
//! result untouched. The pure [`resolve`] function underneath carries the
//! actual logic and is what the tests exercise.

use crate::core::errors::SessionError;
use once_cell::sync::OnceCell;
use url::Url;
use uuid::Uuid;

/// Opaque session identifier
///
/// Adopted verbatim when supplied; any non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of session resolution
#[derive(Debug, Clone)]
pub struct SessionBootstrap {
    /// The established identifier, immutable for the process lifetime
    pub id: SessionId,
    /// Backend URL carrying `?session={id}`; sharing it resumes the session
    pub resume_url: Url,
    /// Whether the identifier was freshly generated (vs. adopted)
    pub generated: bool,
}

static ESTABLISHED: OnceCell<SessionBootstrap> = OnceCell::new();

/// Establish the process-wide session identity
///
/// The first call resolves and pins the identity; every later call returns
/// that same result regardless of its arguments.
pub fn establish(
    base: &Url,
    explicit: Option<&str>,
) -> Result<&'static SessionBootstrap, SessionError> {
    ESTABLISHED.get_or_try_init(|| resolve(base, explicit))
}

/// Resolve a session identity from a backend URL and an optional override
pub fn resolve(base: &Url, explicit: Option<&str>) -> Result<SessionBootstrap, SessionError> {
    if let Some(id) = explicit {
        if id.is_empty() {
            return Err(SessionError::EmptyIdentifier);
        }
        return Ok(SessionBootstrap {
            id: SessionId(id.to_string()),
            resume_url: with_session_param(base, id),
            generated: false,
        });
    }

    if let Some(id) = session_param(base) {
        return Ok(SessionBootstrap {
            id: SessionId(id),
            // Adopted from the URL: the location already carries it.
            resume_url: base.clone(),
            generated: false,
        });
    }

    let id = Uuid::new_v4().to_string();
    tracing::debug!(session = %id, "generated new session identifier");
    Ok(SessionBootstrap {
        resume_url: with_session_param(base, &id),
        id: SessionId(id),
        generated: true,
    })
}

/// Read the `session` query parameter, if present and non-empty
fn session_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == "session" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Return `url` with its `session` query parameter set to `id`
fn with_session_param(base: &Url, id: &str) -> Url {
    let mut url = base.clone();
    let others: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "session")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &others {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("session", id);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:5000").unwrap()
    }

    #[test]
    fn test_generates_when_absent() {
        let bootstrap = resolve(&base(), None).unwrap();
        assert!(bootstrap.generated);
        assert!(!bootstrap.id.as_str().is_empty());
        assert!(bootstrap
            .resume_url
            .query()
            .unwrap()
            .contains(&format!("session={}", bootstrap.id)));
    }

    #[test]
    fn test_reload_with_resume_url_reproduces_the_session() {
        let first = resolve(&base(), None).unwrap();
        let second = resolve(&first.resume_url, None).unwrap();
        assert!(!second.generated);
        assert_eq!(second.id, first.id);
        assert_eq!(second.resume_url, first.resume_url);
    }

    #[test]
    fn test_adopts_url_parameter_verbatim() {
        let url = Url::parse("http://127.0.0.1:5000/?session=abc123").unwrap();
        let bootstrap = resolve(&url, None).unwrap();
        assert!(!bootstrap.generated);
        assert_eq!(bootstrap.id.as_str(), "abc123");
        // Adopted: the location is not rewritten.
        assert_eq!(bootstrap.resume_url, url);
    }

    #[test]
    fn test_explicit_override_wins() {
        let url = Url::parse("http://127.0.0.1:5000/?session=abc123").unwrap();
        let bootstrap = resolve(&url, Some("xyz789")).unwrap();
        assert_eq!(bootstrap.id.as_str(), "xyz789");
        assert_eq!(
            bootstrap.resume_url.query().unwrap(),
            "session=xyz789",
            "override replaces the URL parameter"
        );
    }

    #[test]
    fn test_empty_explicit_is_rejected() {
        let result = resolve(&base(), Some(""));
        assert!(matches!(result, Err(SessionError::EmptyIdentifier)));
    }

    #[test]
    fn test_empty_url_parameter_is_ignored() {
        let url = Url::parse("http://127.0.0.1:5000/?session=").unwrap();
        let bootstrap = resolve(&url, None).unwrap();
        assert!(bootstrap.generated);
    }

    #[test]
    fn test_other_query_parameters_survive_rewrite() {
        let url = Url::parse("http://127.0.0.1:5000/?theme=dark").unwrap();
        let bootstrap = resolve(&url, None).unwrap();
        let query = bootstrap.resume_url.query().unwrap().to_string();
        assert!(query.contains("theme=dark"));
        assert!(query.contains("session="));
    }

    #[test]
    fn test_establish_pins_the_first_identity() {
        let first = establish(&base(), Some("pinned")).unwrap();
        // A second call with different arguments must not regenerate.
        let second = establish(&base(), Some("other")).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.id.as_str(), "pinned");
    }
}
