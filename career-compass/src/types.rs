use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "2.0";

// Inbound request

/// Body of `POST /api/search`.
///
/// `query` is kept as a raw JSON value so that a missing field, a number and
/// an empty string all funnel into the same validation error.
#[derive(Debug, Default)]
pub struct SearchRequest {
    pub query: serde_json::Value,
    pub filters: Option<SearchFilters>,
    pub user_profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_range: Option<serde_json::Value>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    // Clients send either "5 years" or 5.
    #[serde(default)]
    pub experience: Option<serde_json::Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub current_role: Option<String>,
}

// Outbound payload

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebsiteCategory {
    #[serde(rename = "Learning Platform")]
    LearningPlatform,
    #[serde(rename = "Industry Blog")]
    IndustryBlog,
    #[serde(rename = "Professional Network")]
    ProfessionalNetwork,
    #[serde(rename = "Course")]
    Course,
    #[serde(rename = "Community")]
    Community,
    #[serde(rename = "Job Board")]
    JobBoard,
    #[serde(rename = "Career Guide")]
    CareerGuide,
    #[serde(rename = "Tech Blog")]
    TechBlog,
    #[serde(rename = "Code Repository")]
    CodeRepository,
    #[serde(rename = "Q&A Forum")]
    QaForum,
    #[serde(rename = "Reference")]
    Reference,
    #[serde(rename = "Resource")]
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Free,
    Premium,
    Registration,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteRecommendation {
    pub title: String,
    pub url: String,
    pub description: String,
    pub category: WebsiteCategory,
    pub relevance_score: u8,
    pub trust_score: u8,
    pub features: Vec<String>,
    pub is_premium: bool,
    pub access_type: AccessType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerInsights {
    pub practical_guides: Vec<String>,
    pub theoretical_insight: String,
    pub contradictory_take: String,
    pub related_searches: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandTrend {
    Rising,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryFigures {
    pub currency: String,
    pub entry_level: u64,
    pub median: u64,
    pub senior_level: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInsight {
    pub location: String,
    #[serde(default)]
    pub demand: Option<String>,
    #[serde(default)]
    pub average_salary: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsight {
    pub industry: String,
    #[serde(default)]
    pub share_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    pub demand_trend: DemandTrend,
    pub growth_outlook: String,
    pub salary: SalaryFigures,
    pub top_companies: Vec<String>,
    pub required_skills: Vec<String>,
    pub locations: Vec<LocationInsight>,
    pub industries: Vec<IndustryInsight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub total_results: usize,
    /// Milliseconds spent fetching and shaping search results.
    pub search_time: u64,
    pub cache_hit: bool,
    pub api_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchStatus {
    pub fn complete() -> Self {
        Self {
            phase: "complete".to_string(),
            message: None,
        }
    }
}

/// The orchestration result: cached value and `data` of the success envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub recommended_websites: Vec<WebsiteRecommendation>,
    pub market_insights: MarketInsights,
    pub career_insights: CareerInsights,
    pub search_metadata: SearchMetadata,
    pub status: SearchStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchEnvelope {
    pub success: bool,
    pub data: SearchResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

// SerpAPI types

#[derive(Debug, Deserialize)]
pub struct SerpApiResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One organic entry as returned by the search provider.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

// Chat-completion types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
