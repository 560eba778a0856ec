use derive_more::Display;

///
/// NavigablePath
///
/// Dotted navigation path from a query root (`p`, `p.address.city`).
/// Paths are compared structurally; two references to the same attribute
/// through the same root are the same path.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{full}")]
pub struct NavigablePath {
    full: String,
}

impl NavigablePath {
    #[must_use]
    pub fn root(alias: impl Into<String>) -> Self {
        Self { full: alias.into() }
    }

    #[must_use]
    pub fn append(&self, segment: &str) -> Self {
        Self {
            full: format!("{}.{segment}", self.full),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.full.rsplit_once('.').map(|(parent, _)| Self {
            full: parent.to_string(),
        })
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        self.full
            .rsplit_once('.')
            .map_or(self.full.as_str(), |(_, local)| local)
    }

    #[must_use]
    pub fn root_alias(&self) -> &str {
        self.full
            .split_once('.')
            .map_or(self.full.as_str(), |(root, _)| root)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        !self.full.contains('.')
    }

    #[must_use]
    pub fn full_path(&self) -> &str {
        &self.full
    }
}
