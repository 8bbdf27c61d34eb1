use axum::extract::Json;

use crate::api::error::ApiError;
use crate::api::types::AnalysisResponse;
use crate::report::{assemble_report, RiskReport};

/// `POST /api/reports` — turn a previously returned analysis into the
/// payload the external report renderer consumes (Low-risk entries
/// filtered, failed chunks marked, original order preserved).
pub async fn create_report(
    Json(analysis): Json<AnalysisResponse>,
) -> Result<Json<RiskReport>, ApiError> {
    let result = analysis.to_result();
    let report = assemble_report(&analysis.file_name, &result);
    Ok(Json(report))
}
