// Event types for async communication

use crate::api::QueryError;
use crate::controller::RequestId;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A spawned request finished, successfully or not
    QueryFinished {
        id: RequestId,
        result: Result<String, QueryError>,
    },
}
