use serde::{Deserialize, Serialize};

/// Response from `POST /api/interview/start`
#[derive(Debug, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
}

/// Wrapper for `GET /api/interview/latest`
#[derive(Debug, Deserialize)]
pub struct LatestReportResponse {
    pub report: Option<InterviewReport>,
}

/// Scored summary of a completed interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewReport {
    /// Overall score across all dimensions
    pub overall_score: f32,

    /// Communication score
    pub communication: f32,

    /// Technical depth score
    pub technical_depth: f32,

    /// STAR-method structure score
    pub star_method: f32,

    /// Constructive feedback text
    pub feedback: String,

    /// Flattened interview transcript
    pub transcript: String,
}

/// Wrapper for `GET /api/interview/trend`
#[derive(Debug, Deserialize)]
pub struct TrendResponse {
    pub data: Vec<TrendPoint>,
}

/// One historical session score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Completion date, e.g. "Aug 27"
    pub date: String,

    /// Overall score for that session
    pub score: f32,
}
