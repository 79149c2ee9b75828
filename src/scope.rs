//! Role-scoped record visibility.
//!
//! Every listing and every transition goes through [`is_visible`]. The
//! filter fails closed: a missing session, a warden without a usable block,
//! a student without a name, or a record without the relevant scoping field
//! all produce "not visible".

use crate::auth::{Role, User};

/// Scoping fields of a record.
pub trait Scoped {
    /// True when `full_name` owns this record (student-facing scope).
    fn owned_by(&self, full_name: &str) -> bool;

    /// Room number or block code, matched against a warden's block prefix.
    fn location(&self) -> Option<&str>;
}

/// Block code from a warden assignment: `"Block A"` and `"A"` both give `"A"`.
pub fn block_code(block_assigned: &str) -> Option<&str> {
    let code = block_assigned.split_whitespace().last()?;
    if code.eq_ignore_ascii_case("block") {
        return None;
    }
    Some(code)
}

/// A block field equal to `code`, or a room number `<code>-<n>`. Case is
/// ignored.
fn in_block(location: &str, code: &str) -> bool {
    let location = location.trim();
    let head = location.split_once('-').map_or(location, |(head, _)| head);
    head.eq_ignore_ascii_case(code)
}

pub fn is_visible<T: Scoped>(record: &T, user: &User) -> bool {
    match user.role {
        Role::Admin | Role::Management => true,
        Role::Student => {
            let name = user.full_name.trim();
            !name.is_empty() && record.owned_by(name)
        }
        Role::Warden => {
            let Some(code) = user.block_assigned.as_deref().and_then(block_code) else {
                return false;
            };
            record
                .location()
                .map(|loc| in_block(loc, code))
                .unwrap_or(false)
        }
    }
}

/// Subset of `records` visible to `user`, in input order.
pub fn visible<T: Scoped + Clone>(records: &[T], user: Option<&User>) -> Vec<T> {
    let Some(user) = user else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| is_visible(*r, user))
        .cloned()
        .collect()
}
