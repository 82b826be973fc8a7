//! Hierarchical permission resolution.
//!
//! A query path is resolved against a [`PermissionTree`] by looking up the
//! exact path and every wildcard key covering it (`"a.b.c.*"`, `"a.b.*"`,
//! `"a.*"`). Precedence, highest first:
//!
//! 1. a denying wildcard at any level
//! 2. the exact entry for the query
//! 3. any non-denying wildcard
//! 4. default deny
//!
//! - No IO
//! - No panics
//! - Pure function of the tree snapshot and the query

use serde::Serialize;

use permtree_core::PermissionOptions;

use crate::permissions::wildcard_prefixes;
use crate::tree::PermissionTree;

/// Whether the tree grants access to `query`.
pub fn has_access(tree: Option<&PermissionTree>, query: &str) -> bool {
    let granted = explain(tree, query).granted;
    tracing::trace!(query, granted, "resolved access");
    granted
}

/// Effective action set for `query`.
///
/// Every non-denying entry that applies (wildcards at any level plus the exact
/// entry) is merged with [`combine`]. A denying wildcard or a denying exact
/// entry yields [`PermissionOptions::DENIED`].
pub fn get_actions(tree: Option<&PermissionTree>, query: &str) -> PermissionOptions {
    explain(tree, query).options
}

/// Field-wise OR of the `allow_*` flags.
///
/// The result is never denied: denying entries must short-circuit before
/// reaching this point. An empty slice yields [`PermissionOptions::DENIED`].
pub fn combine(options: &[PermissionOptions]) -> PermissionOptions {
    if options.is_empty() {
        return PermissionOptions::DENIED;
    }

    options
        .iter()
        .fold(PermissionOptions::EMPTY_GRANT, |acc, o| PermissionOptions {
            deny_access: false,
            allow_create: acc.allow_create || o.allow_create,
            allow_read: acc.allow_read || o.allow_read,
            allow_update: acc.allow_update || o.allow_update,
            allow_delete: acc.allow_delete || o.allow_delete,
            allow_export: acc.allow_export || o.allow_export,
            allow_print: acc.allow_print || o.allow_print,
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Which rule decided a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// No tree is loaded (or it is empty).
    NoTree,
    /// A wildcard covering the query denies access.
    DeniedByWildcard,
    /// The exact entry for the query denies access.
    DeniedExplicitly,
    /// The exact entry for the query grants access.
    ExactMatch,
    /// Only wildcard entries grant access.
    WildcardGrant,
    /// Nothing in the tree applies to the query.
    NoMatch,
}

/// Detailed explanation of a resolution.
///
/// `granted` and `options` are exactly what [`has_access`] and [`get_actions`]
/// return for the same tree and query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    pub query: String,
    pub granted: bool,
    pub kind: DecisionKind,
    /// Tree keys that decided the outcome, most specific first.
    pub matched: Vec<String>,
    pub options: PermissionOptions,
    pub reason: String,
}

impl AccessExplanation {
    fn denied(query: &str, kind: DecisionKind, matched: Vec<String>, reason: String) -> Self {
        Self {
            query: query.to_string(),
            granted: false,
            kind,
            matched,
            options: PermissionOptions::DENIED,
            reason,
        }
    }
}

/// Resolve `query` and explain why it was granted or denied.
pub fn explain(tree: Option<&PermissionTree>, query: &str) -> AccessExplanation {
    let tree = match tree {
        Some(tree) if !tree.is_empty() => tree,
        _ => {
            return AccessExplanation::denied(
                query,
                DecisionKind::NoTree,
                Vec::new(),
                "no permission tree is loaded".to_string(),
            );
        }
    };

    // Walk every level before granting anything so a coarse denying wildcard
    // still beats a more specific grant.
    let mut wildcards: Vec<(String, PermissionOptions)> = Vec::new();
    for key in wildcard_prefixes(query) {
        if let Some(opts) = tree.get(&key) {
            if opts.is_denied() {
                let reason = format!("wildcard '{key}' denies access");
                return AccessExplanation::denied(query, DecisionKind::DeniedByWildcard, vec![key], reason);
            }
            // A wildcard query is its own exact entry; report it once.
            if key != query {
                wildcards.push((key, *opts));
            }
        }
    }

    let exact = tree.get(query).copied();
    if let Some(opts) = exact {
        if opts.is_denied() {
            return AccessExplanation::denied(
                query,
                DecisionKind::DeniedExplicitly,
                vec![query.to_string()],
                format!("entry '{query}' denies access"),
            );
        }
    }

    let (kind, reason) = match (exact.is_some(), wildcards.is_empty()) {
        (true, true) => (DecisionKind::ExactMatch, format!("entry '{query}' grants access")),
        (true, false) => (
            DecisionKind::ExactMatch,
            format!(
                "entry '{query}' grants access; actions merged with {} wildcard(s)",
                wildcards.len()
            ),
        ),
        (false, false) => (
            DecisionKind::WildcardGrant,
            format!("wildcard '{}' grants access", wildcards[0].0),
        ),
        (false, true) => {
            return AccessExplanation::denied(
                query,
                DecisionKind::NoMatch,
                Vec::new(),
                format!("no entry or wildcard covers '{query}'"),
            );
        }
    };

    let mut matched = Vec::with_capacity(wildcards.len() + 1);
    let mut candidates = Vec::with_capacity(wildcards.len() + 1);
    if let Some(opts) = exact {
        matched.push(query.to_string());
        candidates.push(opts);
    }
    for (key, opts) in wildcards {
        matched.push(key);
        candidates.push(opts);
    }

    let options = match candidates.as_slice() {
        [single] => *single,
        many => combine(many),
    };

    AccessExplanation {
        query: query.to_string(),
        granted: true,
        kind,
        matched,
        options,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permtree_core::{Action, decode_flags};
    use proptest::prelude::*;

    fn tree(entries: &[(&str, &str)]) -> PermissionTree {
        entries
            .iter()
            .map(|(p, o)| (p.to_string(), decode_flags(o).unwrap()))
            .collect()
    }

    fn grant(actions: &[Action]) -> PermissionOptions {
        actions
            .iter()
            .fold(PermissionOptions::EMPTY_GRANT, |acc, a| acc.with(*a, true))
    }

    #[test]
    fn absent_or_empty_tree_denies() {
        assert!(!has_access(None, "a.b"));
        assert_eq!(get_actions(None, "a.b"), PermissionOptions::DENIED);

        let empty = PermissionTree::new();
        assert!(!has_access(Some(&empty), "a.b"));
        assert_eq!(get_actions(Some(&empty), "a.b"), PermissionOptions::DENIED);
        assert_eq!(explain(Some(&empty), "a.b").kind, DecisionKind::NoTree);
    }

    #[test]
    fn exact_match_wins_over_generic_wildcard() {
        let t = tree(&[("a.b", "0010000"), ("a.*", "0000000")]);

        assert!(has_access(Some(&t), "a.b"));
        let actions = get_actions(Some(&t), "a.b");
        assert!(actions.allow_read);
        assert!(!actions.deny_access);
        assert_eq!(explain(Some(&t), "a.b").kind, DecisionKind::ExactMatch);
    }

    #[test]
    fn wildcard_grant_propagates_to_descendants() {
        let t = tree(&[("a.*", "0100000")]);

        assert!(has_access(Some(&t), "a.b.c"));
        assert!(get_actions(Some(&t), "a.b.c").allow_create);
        let explanation = explain(Some(&t), "a.b.c");
        assert_eq!(explanation.kind, DecisionKind::WildcardGrant);
        assert_eq!(explanation.matched, vec!["a.*"]);
    }

    #[test]
    fn wildcard_covers_its_own_prefix() {
        let t = tree(&[("a.b.*", "0010000")]);
        assert!(has_access(Some(&t), "a.b"));
        assert!(!has_access(Some(&t), "a"));
    }

    #[test]
    fn deny_wildcard_revokes_whole_subtree() {
        let t = tree(&[("billing.*", "1000000")]);

        assert!(!has_access(Some(&t), "billing.invoices.view"));
        assert_eq!(get_actions(Some(&t), "billing.invoices.view"), PermissionOptions::DENIED);
    }

    #[test]
    fn coarse_deny_wildcard_beats_specific_exact_grant() {
        let t = tree(&[("a.*", "1000000"), ("a.b.c", "0111111"), ("a.b.*", "0111111")]);

        assert!(!has_access(Some(&t), "a.b.c"));
        assert_eq!(get_actions(Some(&t), "a.b.c"), PermissionOptions::DENIED);
        let explanation = explain(Some(&t), "a.b.c");
        assert_eq!(explanation.kind, DecisionKind::DeniedByWildcard);
        assert_eq!(explanation.matched, vec!["a.*"]);
    }

    #[test]
    fn explicit_deny_beats_wildcard_grant() {
        let t = tree(&[("a.*", "0111111"), ("a.b", "1000000")]);

        assert!(!has_access(Some(&t), "a.b"));
        assert_eq!(get_actions(Some(&t), "a.b"), PermissionOptions::DENIED);
        assert!(has_access(Some(&t), "a.c"));
        assert_eq!(explain(Some(&t), "a.b").kind, DecisionKind::DeniedExplicitly);
    }

    #[test]
    fn unrelated_entries_do_not_match() {
        let t = tree(&[("reports.view", "0010000"), ("ab.*", "0010000")]);

        assert!(!has_access(Some(&t), "reports"));
        assert!(!has_access(Some(&t), "a.b"));
        assert!(!has_access(Some(&t), "reports.view.detail"));
        assert_eq!(explain(Some(&t), "a.b").kind, DecisionKind::NoMatch);
    }

    #[test]
    fn matching_wildcard_levels_are_merged() {
        let t = tree(&[("a.*", "0010000"), ("a.b.*", "0001000"), ("a.b.c", "0000001")]);

        let actions = get_actions(Some(&t), "a.b.c");
        assert_eq!(
            actions.allowed_actions(),
            vec![Action::Read, Action::Update, Action::Print]
        );
        assert_eq!(explain(Some(&t), "a.b.c").matched, vec!["a.b.c", "a.b.*", "a.*"]);
    }

    #[test]
    fn wildcard_key_queried_directly_is_reported_once() {
        let t = tree(&[("a.*", "0010000")]);

        assert!(has_access(Some(&t), "a.*"));
        let explanation = explain(Some(&t), "a.*");
        assert!(explanation.granted);
        assert_eq!(explanation.kind, DecisionKind::ExactMatch);
        assert_eq!(explanation.matched, vec!["a.*"]);
        assert_eq!(explanation.options, get_actions(Some(&t), "a.*"));
    }

    #[test]
    fn single_candidate_is_returned_unchanged() {
        let t = tree(&[("reports.export", "0100001")]);
        assert_eq!(get_actions(Some(&t), "reports.export"), decode_flags("0100001").unwrap());
    }

    #[test]
    fn grant_without_actions_still_allows_access() {
        let t = tree(&[("a.b", "0000000")]);
        assert!(has_access(Some(&t), "a.b"));
        assert!(get_actions(Some(&t), "a.b").allowed_actions().is_empty());
    }

    #[test]
    fn combine_ors_allow_flags() {
        let merged = combine(&[grant(&[Action::Read]), grant(&[Action::Update])]);
        assert_eq!(merged, grant(&[Action::Read, Action::Update]));
    }

    #[test]
    fn combine_of_nothing_is_denied() {
        assert_eq!(combine(&[]), PermissionOptions::DENIED);
    }

    #[test]
    fn odd_queries_resolve_without_panicking() {
        let t = tree(&[("a.*", "0010000")]);
        assert!(!has_access(Some(&t), ""));
        assert!(has_access(Some(&t), "a..b"));
        assert!(!has_access(Some(&t), ".a"));
    }

    #[test]
    fn explanation_serializes_for_audit() {
        let t = tree(&[("billing.*", "1000000")]);
        let json = serde_json::to_value(explain(Some(&t), "billing.view")).unwrap();
        assert_eq!(json["kind"], "denied_by_wildcard");
        assert_eq!(json["granted"], false);
        assert_eq!(json["options"]["denyAccess"], true);
    }

    fn arb_flags() -> impl Strategy<Value = String> {
        "[01]{7}"
    }

    fn arb_path() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4).prop_map(|s| s.join("."))
    }

    fn arb_tree() -> impl Strategy<Value = Vec<(String, String)>> {
        let key = (arb_path(), any::<bool>()).prop_map(|(p, wild)| if wild { format!("{p}.*") } else { p });
        prop::collection::vec((key, arb_flags()), 0..8)
    }

    fn build(entries: &[(String, String)]) -> PermissionTree {
        entries
            .iter()
            .map(|(p, o)| (p.clone(), decode_flags(o).unwrap()))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a denying wildcard at any level of the query always wins.
        #[test]
        fn deny_wildcard_is_supreme(entries in arb_tree(), query in arb_path(), depth in 1usize..4) {
            let mut t = build(&entries);
            let segments: Vec<&str> = query.split('.').collect();
            let depth = depth.min(segments.len());
            let deny_key = format!("{}.*", segments[..depth].join("."));
            t = t.iter()
                .map(|(k, v)| (k.to_string(), *v))
                .chain(std::iter::once((deny_key, PermissionOptions::DENIED)))
                .collect();

            prop_assert!(!has_access(Some(&t), &query));
            prop_assert_eq!(get_actions(Some(&t), &query), PermissionOptions::DENIED);
        }

        /// Property: access is granted exactly when the action set is not denied.
        #[test]
        fn has_access_agrees_with_get_actions(entries in arb_tree(), query in arb_path()) {
            let t = build(&entries);
            prop_assert_eq!(has_access(Some(&t), &query), !get_actions(Some(&t), &query).deny_access);
        }

        /// Property: without a tree, every query is denied.
        #[test]
        fn default_deny_without_tree(query in ".{0,24}") {
            prop_assert!(!has_access(None, &query));
            prop_assert_eq!(get_actions(None, &query), PermissionOptions::DENIED);
        }
    }
}
