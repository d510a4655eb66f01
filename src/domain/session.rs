// Authenticated session context, passed explicitly to whatever needs it
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub id_token: String,
}

impl SessionContext {
    pub fn new(user_id: String, email: Option<String>, id_token: String) -> Self {
        Self {
            user_id,
            email,
            id_token,
        }
    }
}
