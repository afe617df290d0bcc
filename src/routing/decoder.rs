//! Method name decoding.
//!
//! A controller method name carries its routing metadata in a prefix:
//!
//! | prefix                         | verbs        | middleware |
//! |--------------------------------|--------------|------------|
//! | `get`, `post`, ... `head`      | that verb    | none       |
//! | `xget`, `xpost`, ... `xoptions`| that verb    | restricted |
//! | `xany`                         | all verbs    | restricted |
//! | `volt`, `wire`                 | GET + HEAD   | none       |
//! | (no prefix)                    | all verbs    | none       |
//!
//! The rest of the name becomes a hyphenated route fragment:
//! `getUserProfile` → `user-profile`.

use serde::Serialize;

use crate::config::schema::RoutingConfig;
use crate::routing::verb::{HttpVerb, VerbSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Plain(HttpVerb),
    Restricted(HttpVerb),
    RestrictedAny,
    Page,
}

/// Prefix tokens in match priority order: the base list, then the extended one.
const TOKENS: [(&str, TokenKind); 16] = [
    ("get", TokenKind::Plain(HttpVerb::Get)),
    ("post", TokenKind::Plain(HttpVerb::Post)),
    ("put", TokenKind::Plain(HttpVerb::Put)),
    ("patch", TokenKind::Plain(HttpVerb::Patch)),
    ("delete", TokenKind::Plain(HttpVerb::Delete)),
    ("options", TokenKind::Plain(HttpVerb::Options)),
    ("head", TokenKind::Plain(HttpVerb::Head)),
    ("xget", TokenKind::Restricted(HttpVerb::Get)),
    ("xpost", TokenKind::Restricted(HttpVerb::Post)),
    ("xput", TokenKind::Restricted(HttpVerb::Put)),
    ("xpatch", TokenKind::Restricted(HttpVerb::Patch)),
    ("xdelete", TokenKind::Restricted(HttpVerb::Delete)),
    ("xoptions", TokenKind::Restricted(HttpVerb::Options)),
    ("xany", TokenKind::RestrictedAny),
    ("volt", TokenKind::Page),
    ("wire", TokenKind::Page),
];

const SEPARATOR: char = '_';

/// Result of decoding one method name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedName {
    pub verbs: VerbSet,
    /// Hyphenated route fragment; empty for the index marker.
    pub fragment: String,
    pub middleware: Option<String>,
}

/// Decodes method names according to the routing configuration.
#[derive(Debug, Clone)]
pub struct MethodNameDecoder {
    index_marker: String,
    restricted_middleware: String,
}

impl MethodNameDecoder {
    pub fn new(index_marker: impl Into<String>, restricted_middleware: impl Into<String>) -> Self {
        Self {
            index_marker: index_marker.into(),
            restricted_middleware: restricted_middleware.into(),
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(&config.index_marker, &config.restricted_middleware)
    }

    pub fn decode(&self, method_name: &str) -> DecodedName {
        let mut verbs = VerbSet::Any;
        let mut middleware = None;
        let mut residual = method_name.to_string();

        if let Some((token, kind)) = match_prefix(method_name) {
            match kind {
                TokenKind::Plain(verb) => verbs = VerbSet::single(verb),
                TokenKind::Restricted(verb) => {
                    verbs = VerbSet::single(verb);
                    middleware = Some(self.restricted_middleware.clone());
                }
                TokenKind::RestrictedAny => {
                    middleware = Some(self.restricted_middleware.clone());
                }
                TokenKind::Page => verbs = VerbSet::get_head(),
            }
            residual = lower_first(strip_prefix(method_name, token.len()));
        }

        let fragment = hyphenate(&residual);
        let fragment = if fragment == self.index_marker {
            String::new()
        } else {
            fragment
        };

        DecodedName {
            verbs,
            fragment,
            middleware,
        }
    }
}

impl Default for MethodNameDecoder {
    fn default() -> Self {
        Self::from_config(&RoutingConfig::default())
    }
}

fn match_prefix(method_name: &str) -> Option<(&'static str, TokenKind)> {
    TOKENS.iter().copied().find(|(token, _)| {
        method_name
            .get(..token.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(token))
    })
}

/// Drops the first `len` bytes and at most one following separator.
fn strip_prefix(method_name: &str, len: usize) -> &str {
    let rest = &method_name[len..];
    rest.strip_prefix(SEPARATOR).unwrap_or(rest)
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts camel case to a lowercase, hyphenated route fragment.
///
/// A hyphen is inserted between a lowercase letter or digit and a following
/// uppercase letter. Already-hyphenated lowercase input is returned unchanged.
pub fn hyphenate(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut prev: Option<char> = None;

    for c in value.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('-');
        }
        out.push(c);
        prev = Some(c);
    }

    out.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(name: &str) -> DecodedName {
        MethodNameDecoder::default().decode(name)
    }

    #[test]
    fn test_plain_prefix() {
        let decoded = decode("getUserProfile");
        assert_eq!(decoded.verbs, VerbSet::single(HttpVerb::Get));
        assert_eq!(decoded.fragment, "user-profile");
        assert_eq!(decoded.middleware, None);
    }

    #[test]
    fn test_restricted_prefix() {
        let decoded = decode("xpostUser");
        assert_eq!(decoded.verbs, VerbSet::single(HttpVerb::Post));
        assert_eq!(decoded.fragment, "user");
        assert_eq!(decoded.middleware.as_deref(), Some("xhr"));
    }

    #[test]
    fn test_restricted_any_keeps_all_verbs() {
        let decoded = decode("xanyPing");
        assert_eq!(decoded.verbs, VerbSet::Any);
        assert_eq!(decoded.fragment, "ping");
        assert_eq!(decoded.middleware.as_deref(), Some("xhr"));
    }

    #[test]
    fn test_page_prefixes() {
        for name in ["voltSearch", "wireSearch"] {
            let decoded = decode(name);
            assert_eq!(decoded.verbs, VerbSet::get_head());
            assert_eq!(decoded.fragment, "search");
            assert_eq!(decoded.middleware, None);
        }
    }

    #[test]
    fn test_prefix_is_case_insensitive_and_stripped_once() {
        let decoded = decode("GETgetItems");
        assert_eq!(decoded.verbs, VerbSet::single(HttpVerb::Get));
        assert_eq!(decoded.fragment, "get-items");
    }

    #[test]
    fn test_separator_is_stripped() {
        assert_eq!(decode("delete_account").fragment, "account");
        assert_eq!(decode("put__twice").fragment, "_twice");
    }

    #[test]
    fn test_no_prefix_still_hyphenates() {
        let decoded = decode("listAllUsers");
        assert_eq!(decoded.verbs, VerbSet::Any);
        assert_eq!(decoded.fragment, "list-all-users");
        assert_eq!(decoded.middleware, None);
    }

    #[test]
    fn test_index_marker_is_empty_fragment() {
        assert_eq!(decode("index").fragment, "");
        assert_eq!(decode("getIndex").fragment, "");
        assert_eq!(decode("xgetIndex").middleware.as_deref(), Some("xhr"));

        let custom = MethodNameDecoder::new("home", "ajax");
        assert_eq!(custom.decode("getHome").fragment, "");
        assert_eq!(custom.decode("getIndex").fragment, "index");
    }

    #[test]
    fn test_base_list_wins_over_extended() {
        // `head` is a base token, so `headline` decodes as HEAD + `line`.
        let decoded = decode("headline");
        assert_eq!(decoded.verbs, VerbSet::single(HttpVerb::Head));
        assert_eq!(decoded.fragment, "line");
    }

    #[test]
    fn test_hyphenate_idempotent() {
        for input in ["userProfile", "a1B", "already-hyphenated", "HTTPServer", "x"] {
            let once = hyphenate(input);
            assert_eq!(hyphenate(&once), once, "input: {input}");
        }
        assert_eq!(hyphenate("a1B"), "a1-b");
        assert_eq!(hyphenate("HTTPServer"), "httpserver");
        assert_eq!(hyphenate("aBcD"), "a-bc-d");
    }

    #[test]
    fn test_multibyte_name_does_not_panic() {
        let decoded = decode("gé");
        assert_eq!(decoded.verbs, VerbSet::Any);
        assert_eq!(decoded.fragment, "gé");
    }
}
