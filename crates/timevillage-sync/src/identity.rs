//! Signed-in identity

/// Source of the stable user id
///
/// The sign-in flow itself lives elsewhere; sync only needs to know whether
/// someone is signed in and who.
pub trait IdentityProvider: Send + Sync {
    /// Stable user id, `None` when signed out
    fn user_id(&self) -> Option<String>;

    fn is_signed_in(&self) -> bool {
        self.user_id().is_some()
    }
}

/// Identity fixed at startup (from configuration or tests)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

impl From<Option<String>> for StaticIdentity {
    fn from(user_id: Option<String>) -> Self {
        Self {
            user_id: user_id.filter(|id| !id.is_empty()),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
