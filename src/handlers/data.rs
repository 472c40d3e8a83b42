use axum::Json;
use serde::Serialize;
use std::time::Duration;

/// Artificial latency so the duration histogram has something to show.
pub const DATA_DELAY: Duration = Duration::from_millis(100);

const DATA: [u32; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Vec<u32>,
    pub count: usize,
}

// ─── GET /api/data ───────────────────────────────────────────────

pub async fn get_data() -> Json<DataResponse> {
    tokio::time::sleep(DATA_DELAY).await;

    Json(DataResponse {
        data: DATA.to_vec(),
        count: DATA.len(),
    })
}
