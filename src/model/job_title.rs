use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct JobTitle {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Senior Developer")]
    pub name: String,
}
