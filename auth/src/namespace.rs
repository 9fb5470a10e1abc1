use serde::Deserialize;
use serde::Serialize;

/// Authentication context a request resolves its bearer token against.
///
/// Job seekers and companies sign in through separate flows and hold
/// independent access tokens. Operations never mix namespaces: every request
/// names the namespace it authenticates as, defaulting to [`User`].
///
/// [`User`]: TokenNamespace::User
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenNamespace {
    #[default]
    User,
    Company,
}

impl TokenNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenNamespace::User => "user",
            TokenNamespace::Company => "company",
        }
    }
}

impl std::fmt::Display for TokenNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::TokenNamespace;

    #[test]
    fn serializes_to_lowercase_tags() {
        assert_eq!(
            serde_json::to_string(&TokenNamespace::User).unwrap(),
            "\"user\""
        );
        assert_eq!(
            serde_json::to_string(&TokenNamespace::Company).unwrap(),
            "\"company\""
        );
    }

    #[test]
    fn default_namespace_is_user() {
        assert_eq!(TokenNamespace::default(), TokenNamespace::User);
    }
}
