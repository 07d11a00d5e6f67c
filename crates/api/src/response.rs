use serde::Serialize;

/// Standard wrapper for list/detail payloads: `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}
