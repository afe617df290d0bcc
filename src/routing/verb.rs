//! HTTP verbs and verb sets.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// One of the base HTTP verbs a route can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpVerb {
    /// Every base verb, in declaration order.
    pub const ALL: [HttpVerb; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpVerb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Error returned when a string is not a base verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP verb `{0}`")]
pub struct UnknownVerb(pub String);

impl FromStr for HttpVerb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

/// The verbs a synthesized route answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VerbSet {
    /// Every base verb.
    #[default]
    Any,
    /// An explicit, ordered set.
    Only(Vec<HttpVerb>),
}

impl VerbSet {
    /// The `{GET, HEAD}` pair used by page-style methods.
    pub fn get_head() -> Self {
        Self::Only(vec![HttpVerb::Get, HttpVerb::Head])
    }

    pub fn single(verb: HttpVerb) -> Self {
        Self::Only(vec![verb])
    }

    /// True if `verb` is answered.
    pub fn contains(&self, verb: HttpVerb) -> bool {
        match self {
            Self::Any => true,
            Self::Only(verbs) => verbs.contains(&verb),
        }
    }

    /// Expands to the concrete verb list.
    pub fn verbs(&self) -> Vec<HttpVerb> {
        match self {
            Self::Any => HttpVerb::ALL.to_vec(),
            Self::Only(verbs) => verbs.clone(),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for VerbSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("ANY"),
            Self::Only(verbs) => {
                let names: Vec<&str> = verbs.iter().map(HttpVerb::as_str).collect();
                f.write_str(&names.join("|"))
            }
        }
    }
}

impl Serialize for VerbSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.verbs().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb_case_insensitive() {
        assert_eq!("get".parse::<HttpVerb>(), Ok(HttpVerb::Get));
        assert_eq!("OPTIONS".parse::<HttpVerb>(), Ok(HttpVerb::Options));
        assert!("trace".parse::<HttpVerb>().is_err());
    }

    #[test]
    fn test_verb_set_membership() {
        assert!(VerbSet::Any.contains(HttpVerb::Delete));
        assert_eq!(VerbSet::Any.verbs().len(), 7);

        let page = VerbSet::get_head();
        assert!(page.contains(HttpVerb::Head));
        assert!(!page.contains(HttpVerb::Post));
        assert_eq!(page.to_string(), "GET|HEAD");
    }
}
