//! Records with a stable identity.

/// A record whose identity survives changes to its fields.
///
/// Two versions of the same student (before and after an update) are the
/// same record even though their contents differ.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Whether `other` is a version of the same record.
    fn same_record(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StudentId;

    struct Named {
        id: StudentId,
        name: &'static str,
    }

    impl Entity for Named {
        type Id = StudentId;

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    #[test]
    fn identity_ignores_contents() {
        let id = StudentId::new();
        let before = Named { id, name: "Ana" };
        let after = Named { id, name: "Ana Maria" };
        let other = Named {
            id: StudentId::new(),
            name: "Ana",
        };

        assert_ne!(before.name, after.name);
        assert!(before.same_record(&after));
        assert!(!before.same_record(&other));
    }
}
