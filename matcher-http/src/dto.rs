use serde::{Deserialize, Serialize};

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_description: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub resume_id: String,
    pub filename: String,
}

impl From<resume_matcher::UploadReceipt> for UploadResponse {
    fn from(receipt: resume_matcher::UploadReceipt) -> Self {
        Self {
            message: "Resume successfully uploaded and indexed.".to_string(),
            resume_id: receipt.resume_id,
            filename: receipt.filename,
        }
    }
}
