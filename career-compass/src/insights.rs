//! AI-generated career and market insights.
//!
//! Each generator issues one completion and validates the model's text
//! against a fixed schema. Validation failures come back as an
//! [`InsightError`]; callers substitute [`fallback_career_insights`] or
//! [`fallback_market_insights`] instead of failing the request.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

use crate::providers::CompletionProvider;
use crate::types::*;

pub const MIN_PRACTICAL_GUIDES: usize = 4;
pub const MAX_PRACTICAL_GUIDES: usize = 6;

const CAREER_TEMPERATURE: f32 = 0.7;
const MARKET_TEMPERATURE: f32 = 0.3;

const CAREER_SYSTEM_PROMPT: &str = "You are an experienced career advisor. \
Answer with a single JSON object and nothing else, using exactly these keys: \
\"practicalGuides\" (array of 4 to 6 short, actionable steps), \
\"theoreticalInsight\" (one paragraph on the underlying career dynamics), \
\"contradictoryTake\" (one paragraph arguing against conventional advice), \
\"relatedSearches\" (array of up to 5 follow-up search queries).";

const MARKET_SYSTEM_PROMPT: &str = "You are a labour-market analyst. \
Answer with a single JSON object and nothing else, using exactly these keys: \
\"demandTrend\" (one of \"rising\", \"stable\", \"declining\"), \
\"growthOutlook\" (short phrase), \
\"salary\" (object with \"currency\", \"entryLevel\", \"median\", \"seniorLevel\" \
as annual numbers), \
\"topCompanies\" (array of company names), \
\"requiredSkills\" (array of skills), \
\"locations\" (array of objects with \"location\", \"demand\", \"averageSalary\"), \
\"industries\" (array of objects with \"industry\", \"sharePercent\").";

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("completion provider failed: {0}")]
    Provider(String),

    #[error("model output is not valid JSON: {0}")]
    Malformed(String),

    #[error("model output failed validation: {0}")]
    Invalid(String),
}

pub fn fallback_career_insights() -> CareerInsights {
    CareerInsights::default()
}

pub fn fallback_market_insights() -> MarketInsights {
    MarketInsights {
        demand_trend: DemandTrend::Stable,
        growth_outlook: "unknown".to_string(),
        salary: SalaryFigures {
            currency: "USD".to_string(),
            entry_level: 0,
            median: 0,
            senior_level: 0,
        },
        top_companies: Vec::new(),
        required_skills: Vec::new(),
        locations: Vec::new(),
        industries: Vec::new(),
    }
}

pub async fn generate_career_insights(
    provider: &dyn CompletionProvider,
    query: &str,
    profile: Option<&UserProfile>,
) -> Result<CareerInsights, InsightError> {
    let prompt = career_prompt(query, profile);
    let text = provider
        .complete(CAREER_SYSTEM_PROMPT, &prompt, CAREER_TEMPERATURE)
        .await
        .map_err(|e| InsightError::Provider(e.to_string()))?;
    parse_career_insights(&text)
}

pub async fn generate_market_insights(
    provider: &dyn CompletionProvider,
    query: &str,
) -> Result<MarketInsights, InsightError> {
    let prompt = format!(
        "Describe the current job market for: \"{}\". Use realistic figures.",
        query
    );
    let text = provider
        .complete(MARKET_SYSTEM_PROMPT, &prompt, MARKET_TEMPERATURE)
        .await
        .map_err(|e| InsightError::Provider(e.to_string()))?;
    parse_market_insights(&text)
}

fn career_prompt(query: &str, profile: Option<&UserProfile>) -> String {
    let mut prompt = format!("Career question: \"{}\".", query);
    let Some(profile) = profile else {
        return prompt;
    };

    let mut details = Vec::new();
    if let Some(role) = profile.current_role.as_deref().filter(|r| !r.trim().is_empty()) {
        details.push(format!("current role: {}", role.trim()));
    }
    match &profile.experience {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
            details.push(format!("experience: {}", s.trim()))
        }
        Some(serde_json::Value::Number(n)) => details.push(format!("experience: {} years", n)),
        _ => {}
    }
    if !profile.skills.is_empty() {
        details.push(format!("skills: {}", profile.skills.join(", ")));
    }
    if let Some(location) = profile.location.as_deref().filter(|l| !l.trim().is_empty()) {
        details.push(format!("location: {}", location.trim()));
    }
    if !details.is_empty() {
        prompt.push_str(&format!(" Tailor the advice to this person ({}).", details.join("; ")));
    }
    prompt
}

/// Strip Markdown code fences and any prose around the outermost JSON object.
fn extract_json(text: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").ok());

    let inner = fence
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);

    match (inner.find('{'), inner.rfind('}')) {
        (Some(start), Some(end)) if start < end => &inner[start..=end],
        _ => inner.trim(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCareerInsights {
    practical_guides: Vec<String>,
    theoretical_insight: String,
    contradictory_take: String,
    #[serde(default)]
    related_searches: Vec<String>,
}

pub fn parse_career_insights(text: &str) -> Result<CareerInsights, InsightError> {
    let raw: RawCareerInsights = serde_json::from_str(extract_json(text))
        .map_err(|e| InsightError::Malformed(e.to_string()))?;

    let mut practical_guides = clean_list(raw.practical_guides);
    if practical_guides.len() < MIN_PRACTICAL_GUIDES {
        return Err(InsightError::Invalid(format!(
            "expected at least {} practical guides, got {}",
            MIN_PRACTICAL_GUIDES,
            practical_guides.len()
        )));
    }
    practical_guides.truncate(MAX_PRACTICAL_GUIDES);

    let theoretical_insight = raw.theoretical_insight.trim().to_string();
    if theoretical_insight.is_empty() {
        return Err(InsightError::Invalid("theoreticalInsight is empty".into()));
    }

    Ok(CareerInsights {
        practical_guides,
        theoretical_insight,
        contradictory_take: raw.contradictory_take.trim().to_string(),
        related_searches: clean_list(raw.related_searches),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSalary {
    #[serde(default)]
    currency: Option<String>,
    entry_level: f64,
    median: f64,
    senior_level: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    location: String,
    #[serde(default)]
    demand: Option<String>,
    #[serde(default)]
    average_salary: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarketInsights {
    demand_trend: String,
    #[serde(default)]
    growth_outlook: Option<String>,
    salary: RawSalary,
    #[serde(default)]
    top_companies: Vec<String>,
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    locations: Vec<RawLocation>,
    #[serde(default)]
    industries: Vec<IndustryInsight>,
}

pub fn parse_market_insights(text: &str) -> Result<MarketInsights, InsightError> {
    let raw: RawMarketInsights = serde_json::from_str(extract_json(text))
        .map_err(|e| InsightError::Malformed(e.to_string()))?;

    let demand_trend = match raw.demand_trend.trim().to_lowercase().as_str() {
        "rising" | "growing" | "increasing" => DemandTrend::Rising,
        "stable" | "steady" => DemandTrend::Stable,
        "declining" | "decreasing" => DemandTrend::Declining,
        other => {
            return Err(InsightError::Invalid(format!("unknown demandTrend {:?}", other)));
        }
    };

    let salary = &raw.salary;
    if [salary.entry_level, salary.median, salary.senior_level]
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err(InsightError::Invalid("salary figures must be non-negative".into()));
    }
    debug!("Parsed market insights with trend {:?}", demand_trend);

    Ok(MarketInsights {
        demand_trend,
        growth_outlook: raw
            .growth_outlook
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        salary: SalaryFigures {
            currency: raw
                .salary
                .currency
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "USD".to_string()),
            entry_level: raw.salary.entry_level.round() as u64,
            median: raw.salary.median.round() as u64,
            senior_level: raw.salary.senior_level.round() as u64,
        },
        top_companies: clean_list(raw.top_companies),
        required_skills: clean_list(raw.required_skills),
        locations: raw
            .locations
            .into_iter()
            .filter(|l| !l.location.trim().is_empty())
            .map(|l| LocationInsight {
                location: l.location.trim().to_string(),
                demand: l.demand,
                average_salary: l
                    .average_salary
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as u64),
            })
            .collect(),
        industries: raw
            .industries
            .into_iter()
            .filter(|i| !i.industry.trim().is_empty())
            .collect(),
    })
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CAREER_JSON: &str = r#"{
        "practicalGuides": [
            "Ship a side project", "Shadow a PM", "Learn SQL", "Write specs", "Talk to users"
        ],
        "theoreticalInsight": "Product management rewards judgement under uncertainty.",
        "contradictoryTake": "You may not need a title change to do product work.",
        "relatedSearches": ["associate product manager", " "]
    }"#;

    const MARKET_JSON: &str = r#"{
        "demandTrend": "Rising",
        "growthOutlook": "10% over five years",
        "salary": {
            "currency": "usd", "entryLevel": 85000.4, "median": 120000, "seniorLevel": 165000
        },
        "topCompanies": ["Google", "Stripe"],
        "requiredSkills": ["Roadmapping", "Analytics"],
        "locations": [{"location": "San Francisco", "demand": "high", "averageSalary": 150000}],
        "industries": [{"industry": "Technology", "sharePercent": 62.5}]
    }"#;

    struct ScriptedProvider {
        reply: Result<String, String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            _temperature: f32,
        ) -> anyhow::Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[test]
    fn test_parse_career_insights() {
        let insights = parse_career_insights(CAREER_JSON).unwrap();
        assert_eq!(insights.practical_guides.len(), 5);
        assert_eq!(insights.related_searches, vec!["associate product manager"]);
        assert!(insights.contradictory_take.starts_with("You may not"));
    }

    #[test]
    fn test_parse_accepts_fenced_output() {
        let fenced = format!("Here you go:\n```json\n{}\n```\nGood luck!", CAREER_JSON);
        assert!(parse_career_insights(&fenced).is_ok());
    }

    #[test]
    fn test_too_few_guides_is_invalid() {
        let text = r#"{
            "practicalGuides": ["a", "b"],
            "theoreticalInsight": "t",
            "contradictoryTake": "c"
        }"#;
        assert!(matches!(parse_career_insights(text), Err(InsightError::Invalid(_))));
    }

    #[test]
    fn test_extra_guides_are_truncated() {
        let text = r#"{
            "practicalGuides": ["1", "2", "3", "4", "5", "6", "7", "8"],
            "theoreticalInsight": "t",
            "contradictoryTake": "c"
        }"#;
        let insights = parse_career_insights(text).unwrap();
        assert_eq!(insights.practical_guides.len(), MAX_PRACTICAL_GUIDES);
    }

    #[test]
    fn test_missing_field_or_prose_is_malformed() {
        let text = r#"{"practicalGuides": ["1","2","3","4"], "contradictoryTake": "c"}"#;
        assert!(matches!(parse_career_insights(text), Err(InsightError::Malformed(_))));
        assert!(matches!(
            parse_career_insights("I cannot help with that."),
            Err(InsightError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_market_insights() {
        let insights = parse_market_insights(MARKET_JSON).unwrap();
        assert_eq!(insights.demand_trend, DemandTrend::Rising);
        assert_eq!(insights.salary.currency, "USD");
        assert_eq!(insights.salary.entry_level, 85000);
        assert_eq!(insights.locations[0].average_salary, Some(150000));
        assert_eq!(insights.industries[0].share_percent, Some(62.5));
    }

    #[test]
    fn test_unknown_trend_is_invalid() {
        let text = MARKET_JSON.replace("Rising", "sideways");
        assert!(matches!(parse_market_insights(&text), Err(InsightError::Invalid(_))));
    }

    #[test]
    fn test_fallbacks_are_neutral() {
        let market = fallback_market_insights();
        assert_eq!(market.demand_trend, DemandTrend::Stable);
        assert_eq!(market.growth_outlook, "unknown");
        assert!(market.top_companies.is_empty());
        let career = fallback_career_insights();
        assert!(career.practical_guides.is_empty());
        assert!(career.theoretical_insight.is_empty());
    }

    #[tokio::test]
    async fn test_profile_is_included_in_prompt() {
        let provider = ScriptedProvider {
            reply: Ok(CAREER_JSON.to_string()),
            prompts: Mutex::new(Vec::new()),
        };
        let profile = UserProfile {
            skills: vec!["SQL".into(), "Figma".into()],
            experience: Some(serde_json::json!(4)),
            location: None,
            current_role: Some("Designer".into()),
        };

        generate_career_insights(&provider, "product manager transition", Some(&profile))
            .await
            .unwrap();

        let prompts = provider.prompts.lock().unwrap();
        let (system, user) = &prompts[0];
        assert!(system.contains("practicalGuides"));
        assert!(user.contains("product manager transition"));
        assert!(user.contains("current role: Designer"));
        assert!(user.contains("experience: 4 years"));
        assert!(user.contains("skills: SQL, Figma"));
    }

    #[tokio::test]
    async fn test_provider_error_is_typed() {
        let provider = ScriptedProvider {
            reply: Err("connection refused".into()),
            prompts: Mutex::new(Vec::new()),
        };
        let err = generate_market_insights(&provider, "nurse").await.unwrap_err();
        assert!(matches!(err, InsightError::Provider(ref m) if m.contains("connection refused")));
    }
}
