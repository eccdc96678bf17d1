pub mod brand_voice;
pub mod content;
pub mod job;
pub mod profile;

use serde::Serialize;

/// Success envelope shared by the JSON endpoints: `{ success: true, data }`.
/// Failures go through `AppError`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
