use serde::{Deserialize, Serialize};

// Authentication attempt submitted for a decision
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Attempt {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ip: String,
}

// Blacklist/whitelist mutation body
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct NetworkRequest {
    pub network: String,
}

// Bucket reset body - password is never needed here
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ResetRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub ip: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ErrorBody {
    pub error: String,
}
