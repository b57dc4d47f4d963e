//! Static URL classification rules for search results.
//!
//! A rule is `domain` or `domain/path-prefix`: it matches when the URL's host
//! is the domain or a subdomain of it and the path starts with the prefix.
//! Tables are ordered and the first match wins, so more specific patterns (a
//! path on a host) must precede the bare host.

use crate::types::{AccessType, WebsiteCategory};

/// Job-listing pages are dropped from recommendations entirely.
const JOB_LISTING_PATTERNS: &[&str] = &[
    "linkedin.com/jobs",
    "indeed.com/viewjob",
    "indeed.com/jobs",
    "indeed.com/q-",
    "glassdoor.com/job-listing",
    "glassdoor.com/jobs",
    "monster.com/job-openings",
    "monster.com/jobs",
    "ziprecruiter.com/c/",
    "ziprecruiter.com/jobs",
    "dice.com/job-detail",
    "simplyhired.com/job",
];

const CATEGORY_RULES: &[(&str, WebsiteCategory)] = &[
    ("github.com", WebsiteCategory::CodeRepository),
    ("gitlab.com", WebsiteCategory::CodeRepository),
    ("stackoverflow.com", WebsiteCategory::QaForum),
    ("stackexchange.com", WebsiteCategory::QaForum),
    ("quora.com", WebsiteCategory::QaForum),
    ("wikipedia.org", WebsiteCategory::Reference),
    ("developer.mozilla.org", WebsiteCategory::Reference),
    ("bls.gov", WebsiteCategory::Reference),
    ("linkedin.com/learning", WebsiteCategory::LearningPlatform),
    ("coursera.org", WebsiteCategory::LearningPlatform),
    ("edx.org", WebsiteCategory::LearningPlatform),
    ("khanacademy.org", WebsiteCategory::LearningPlatform),
    ("pluralsight.com", WebsiteCategory::LearningPlatform),
    ("codecademy.com", WebsiteCategory::LearningPlatform),
    ("freecodecamp.org", WebsiteCategory::LearningPlatform),
    ("skillshare.com", WebsiteCategory::LearningPlatform),
    ("udemy.com", WebsiteCategory::Course),
    ("udacity.com", WebsiteCategory::Course),
    ("classcentral.com", WebsiteCategory::Course),
    ("linkedin.com", WebsiteCategory::ProfessionalNetwork),
    ("reddit.com", WebsiteCategory::Community),
    ("news.ycombinator.com", WebsiteCategory::Community),
    ("discord.com", WebsiteCategory::Community),
    ("discord.gg", WebsiteCategory::Community),
    ("indeed.com", WebsiteCategory::JobBoard),
    ("glassdoor.com", WebsiteCategory::JobBoard),
    ("monster.com", WebsiteCategory::JobBoard),
    ("ziprecruiter.com", WebsiteCategory::JobBoard),
    ("dev.to", WebsiteCategory::TechBlog),
    ("medium.com", WebsiteCategory::TechBlog),
    ("hashnode.dev", WebsiteCategory::TechBlog),
    ("hashnode.com", WebsiteCategory::TechBlog),
    ("towardsdatascience.com", WebsiteCategory::TechBlog),
    ("forbes.com", WebsiteCategory::IndustryBlog),
    ("hbr.org", WebsiteCategory::IndustryBlog),
    ("businessinsider.com", WebsiteCategory::IndustryBlog),
    ("techcrunch.com", WebsiteCategory::IndustryBlog),
    ("themuse.com", WebsiteCategory::CareerGuide),
    ("thebalancemoney.com", WebsiteCategory::CareerGuide),
    ("careerfoundry.com", WebsiteCategory::CareerGuide),
    ("roadmap.sh", WebsiteCategory::CareerGuide),
];

/// Government and academic hosts rank with reference sites.
const INSTITUTIONAL_SUFFIXES: &[&str] = &["gov", "edu"];

/// Major content and learning platforms.
const MEDIUM_TRUST: &[&str] = &[
    "coursera.org",
    "edx.org",
    "udemy.com",
    "khanacademy.org",
    "pluralsight.com",
    "linkedin.com",
    "medium.com",
    "freecodecamp.org",
    "forbes.com",
    "hbr.org",
    "glassdoor.com",
    "indeed.com",
];

const ACCESS_RULES: &[(&str, AccessType)] = &[
    ("linkedin.com/learning", AccessType::Premium),
    ("coursera.org", AccessType::Premium),
    ("udemy.com", AccessType::Premium),
    ("pluralsight.com", AccessType::Premium),
    ("skillshare.com", AccessType::Premium),
    ("udacity.com", AccessType::Premium),
    ("masterclass.com", AccessType::Premium),
    ("edx.org", AccessType::Registration),
    ("codecademy.com", AccessType::Registration),
    ("linkedin.com", AccessType::Registration),
    ("medium.com", AccessType::Registration),
    ("glassdoor.com", AccessType::Registration),
    ("github.com", AccessType::Free),
    ("gitlab.com", AccessType::Free),
    ("stackoverflow.com", AccessType::Free),
    ("stackexchange.com", AccessType::Free),
    ("wikipedia.org", AccessType::Free),
    ("developer.mozilla.org", AccessType::Free),
    ("freecodecamp.org", AccessType::Free),
    ("khanacademy.org", AccessType::Free),
    ("reddit.com", AccessType::Free),
    ("dev.to", AccessType::Free),
    ("roadmap.sh", AccessType::Free),
    ("bls.gov", AccessType::Free),
];

const FEATURE_VOCABULARY: &[(&str, &str)] = &[
    ("guide", "Guide"),
    ("tutorial", "Tutorial"),
    ("course", "Course"),
    ("article", "Article"),
    ("documentation", "Documentation"),
];

pub const RELEVANCE_FLOOR: u8 = 50;

fn first_match<T: Copy>(url: &str, rules: &[(&str, T)]) -> Option<T> {
    let (host, path) = url_parts(url)?;
    rules
        .iter()
        .find(|(pattern, _)| rule_matches(&host, &path, pattern))
        .map(|(_, value)| *value)
}

fn rule_matches(host: &str, path: &str, pattern: &str) -> bool {
    let (domain, prefix) = match pattern.find('/') {
        Some(i) => pattern.split_at(i),
        None => (pattern, ""),
    };
    host_matches(host, domain) && path.starts_with(prefix)
}

pub fn is_job_listing(url: &str) -> bool {
    url_parts(url).map_or(false, |(host, path)| {
        JOB_LISTING_PATTERNS
            .iter()
            .any(|p| rule_matches(&host, &path, p))
    })
}

pub fn category_for(url: &str) -> WebsiteCategory {
    first_match(url, CATEGORY_RULES).unwrap_or(WebsiteCategory::Resource)
}

/// Reference, code and Q&A categories are the high tier; the rest is by host.
pub fn trust_score_for(url: &str) -> u8 {
    let host = url_parts(url).map(|(host, _)| host).unwrap_or_default();
    let high_tier = matches!(
        category_for(url),
        WebsiteCategory::CodeRepository | WebsiteCategory::QaForum | WebsiteCategory::Reference
    );
    if high_tier || INSTITUTIONAL_SUFFIXES.iter().any(|d| host_matches(&host, d)) {
        90
    } else if MEDIUM_TRUST.iter().any(|d| host_matches(&host, d)) {
        80
    } else {
        70
    }
}

pub fn access_type_for(url: &str) -> AccessType {
    first_match(url, ACCESS_RULES).unwrap_or(AccessType::Unknown)
}

/// Linear decay by zero-based rank: 100, 95, 90, ... floored at 50.
pub fn relevance_score(position: usize) -> u8 {
    let decayed = 100usize.saturating_sub(position.saturating_mul(5));
    decayed.max(RELEVANCE_FLOOR as usize) as u8
}

pub fn features_for(snippet: &str) -> Vec<String> {
    let snippet = snippet.to_lowercase();
    FEATURE_VOCABULARY
        .iter()
        .filter(|(needle, _)| snippet.contains(needle))
        .map(|(_, label)| label.to_string())
        .collect()
}

/// `host` is `domain` itself or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .map_or(false, |rest| rest.ends_with('.'))
}

/// Lower-cased host and path; `None` for URLs without a host.
fn url_parts(url: &str) -> Option<(String, String)> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some((host, parsed.path().to_lowercase()))
}
