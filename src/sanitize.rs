//! Collection name derivation.
//!
//! Maps a human organization name to the identifier of its physical
//! collection. The mapping is pure and deterministic; the orchestrator, not
//! this module, is responsible for rejecting collisions between distinct
//! display names that sanitize to the same identifier.

/// Namespace tag prepended to every derived identifier so tenant collections
/// can never collide with system tables.
pub const COLLECTION_PREFIX: &str = "org_";

/// Derives a physical collection identifier from an organization display name.
///
/// Lowercases, collapses runs of whitespace into single underscores, and
/// drops every remaining character outside `[a-z0-9_]`. Derived identifiers
/// are interpolated into DDL statements, so the output alphabet is restricted
/// to characters that are safe in an unquoted identifier position.
pub fn sanitize(display_name: &str) -> String {
    let mut out = String::with_capacity(COLLECTION_PREFIX.len() + display_name.len());
    out.push_str(COLLECTION_PREFIX);

    let mut pending_separator = false;
    for ch in display_name.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
            continue;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.push(ch);
    }

    out
}
