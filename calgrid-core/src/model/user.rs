//! Users and the identity-provider payload they are built from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

/// Session payload returned by the external identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdpUser {
    pub identity: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: String,
    pub traits: IdpTraits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpTraits {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<IdpUser> for User {
    fn from(idp: IdpUser) -> Self {
        let Identity { id, traits } = idp.identity;
        let name = format!("{} {}", traits.first_name, traits.last_name)
            .trim()
            .to_string();

        User {
            id,
            name,
            username: traits.username,
            email: traits.email,
            avatar: traits.avatar.unwrap_or_default(),
        }
    }
}
