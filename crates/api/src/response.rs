//! Success bodies are wrapped as `{ "data": ... }`; errors use the
//! `{ "error", "code" }` shape from [`crate::error`].

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
