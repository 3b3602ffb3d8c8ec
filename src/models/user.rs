use serde::{Deserialize, Serialize};

/// One row of the invitable-user search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMatch {
    pub fullname: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Already a member of the project; shown but not selectable.
    #[serde(default)]
    pub joined: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    #[serde(default)]
    pub users: Vec<UserMatch>,
}
