//! Role checks for the collection-scope operations. Ownership of single
//! comments is not decided here: the store's conditional writes carry the
//! author check into the statement itself.

use kommentar_common::model::auth::Caller;

/// Admins are barred from authoring comments; everyone else may post.
#[must_use]
pub fn may_create_comments(caller: Caller) -> bool {
    !caller.admin
}

/// Wiping the whole collection is reserved for admins.
#[must_use]
pub fn may_remove_all_comments(caller: Caller) -> bool {
    caller.admin
}

#[cfg(test)]
mod tests {
    use crate::server::policy;
    use kommentar_common::model::{Id, auth::Caller};

    fn caller(admin: bool) -> Caller {
        Caller {
            id: Id::generate(),
            admin,
        }
    }

    #[test]
    fn only_regular_users_may_create() {
        assert!(policy::may_create_comments(caller(false)));
        assert!(!policy::may_create_comments(caller(true)));
    }

    #[test]
    fn only_admins_may_remove_all() {
        assert!(policy::may_remove_all_comments(caller(true)));
        assert!(!policy::may_remove_all_comments(caller(false)));
    }
}
