use serde::{Deserialize, Serialize};

/// One ranked candidate as returned by the matching service. Field names
/// mirror the upstream talent-profile columns exactly; everything beyond
/// identity is optional because profiles are sparsely filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "First Name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "Last Name", default)]
    pub last_name: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Profile Description", default)]
    pub profile_description: Option<String>,
    #[serde(rename = "Monthly Rate", default)]
    pub monthly_rate: Option<f64>,
    #[serde(rename = "Hourly Rate", default)]
    pub hourly_rate: Option<f64>,
    #[serde(rename = "# of Views by Creators", default)]
    pub views: Option<f64>,
    #[serde(rename = "Job Types", default)]
    pub job_types: Option<String>,
    #[serde(rename = "Skills", default)]
    pub skills: Option<String>,
    #[serde(rename = "Software", default)]
    pub software: Option<String>,
    #[serde(rename = "Content Verticals", alias = "Content verticals", default)]
    pub content_verticals: Option<String>,
    #[serde(rename = "Creative Styles", alias = "Creative styles", default)]
    pub creative_styles: Option<String>,
    #[serde(rename = "Platforms", default)]
    pub platforms: Option<String>,
    #[serde(rename = "Past Creators", alias = "Past creators", default)]
    pub past_creators: Option<String>,

    // Server-derived convenience fields.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,

    // Relevance scores. Raw values may exceed 1.0 upstream; consumers go
    // through ranking::effective_score, never these directly.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub final_score: Option<f64>,
}

impl Candidate {
    /// Display name, with missing parts treated as empty.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let name = format!("{} {}", first, last);
        let trimmed = name.trim();
        if trimmed.is_empty() {
            "Unknown".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// City-else-country, matching how the service composes locations.
    pub fn location_text(&self) -> &str {
        match self.city.as_deref() {
            Some(city) if !city.is_empty() => city,
            _ => self.country.as_deref().unwrap_or(""),
        }
    }

    pub fn display_location(&self) -> String {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) if !city.is_empty() && !country.is_empty() => {
                format!("{}, {}", city, country)
            }
            (Some(city), _) if !city.is_empty() => city.to_string(),
            (_, Some(country)) if !country.is_empty() => country.to_string(),
            _ => "Location not specified".to_string(),
        }
    }

    /// Monthly rate if present, else hourly, else 0. Used by the rate
    /// filter and sort; absence deliberately compares as zero.
    pub fn rate(&self) -> f64 {
        self.monthly_rate.or(self.hourly_rate).unwrap_or(0.0)
    }

    pub fn has_rate(&self) -> bool {
        self.monthly_rate.is_some() || self.hourly_rate.is_some()
    }

    pub fn display_rate(&self) -> String {
        if let Some(rate) = self.monthly_rate.filter(|r| *r > 0.0) {
            format!("${}/month", rate)
        } else if let Some(rate) = self.hourly_rate.filter(|r| *r > 0.0) {
            format!("${}/hour", rate)
        } else {
            "Rate not specified".to_string()
        }
    }

    pub fn views_count(&self) -> f64 {
        self.views.unwrap_or(0.0)
    }

    pub fn job_types_list(&self) -> Vec<String> {
        split_tags(self.job_types.as_deref())
    }

    pub fn skills_list(&self) -> Vec<String> {
        split_tags(self.skills.as_deref())
    }

    pub fn software_list(&self) -> Vec<String> {
        split_tags(self.software.as_deref())
    }

    pub fn content_verticals_list(&self) -> Vec<String> {
        split_tags(self.content_verticals.as_deref())
    }

    pub fn creative_styles_list(&self) -> Vec<String> {
        split_tags(self.creative_styles.as_deref())
    }

    pub fn platforms_list(&self) -> Vec<String> {
        split_tags(self.platforms.as_deref())
    }

    pub fn past_creators_list(&self) -> Vec<String> {
        split_tags(self.past_creators.as_deref())
    }
}

/// Parse a comma-delimited attribute field into ordered trimmed entries.
/// The single place this format is interpreted.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Abbreviated candidate embedded in chat responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePreview {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Result-count choices offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TopK {
    #[value(name = "5")]
    Five,
    #[default]
    #[value(name = "10")]
    Ten,
    #[value(name = "15")]
    Fifteen,
    #[value(name = "20")]
    Twenty,
}

impl TopK {
    pub fn as_u32(self) -> u32 {
        match self {
            TopK::Five => 5,
            TopK::Ten => 10,
            TopK::Fifteen => 15,
            TopK::Twenty => 20,
        }
    }
}

/// Per-criterion scoring weights for the weighted request variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub bio: f64,
    pub skills: f64,
    pub software: f64,
    pub location: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            bio: 0.5,
            skills: 0.2,
            software: 0.2,
            location: 0.1,
        }
    }
}

/// A user-authored query, immutable once sent. Only the most recent one is
/// kept for display context.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub description: String,
    pub top_k: TopK,
    pub weights: Option<Weights>,
}

impl JobRequest {
    pub fn basic(description: impl Into<String>, top_k: TopK) -> Self {
        Self {
            description: description.into(),
            top_k,
            weights: None,
        }
    }

    pub fn weighted(description: impl Into<String>, top_k: TopK, weights: Weights) -> Self {
        Self {
            description: description.into(),
            top_k,
            weights: Some(weights),
        }
    }
}

pub struct PresetJob {
    pub title: &'static str,
    pub description: &'static str,
}

/// Sample openings offered as quick-start input.
pub const PRESET_JOBS: [PresetJob; 3] = [
    PresetJob {
        title: "Video Editor - Entertainment/Lifestyle",
        description: "Looking for a talented Video Editor with experience in Adobe Premiere Pro \
            who can edit content in Entertainment/Lifestyle & Vlogs categories. Required skills: \
            Splice & Dice, Rough Cut & Sequencing, 2D Animation. Budget: $2500/month. Open to all \
            locations but preference for Asia.",
    },
    PresetJob {
        title: "Producer/Video Editor - Education/Food",
        description: "Hiring a Producer/Video Editor based in New York (1st priority) or remote \
            from the US to help scale channel in Entertainment/Education/Food & Cooking vertical. \
            Deep experience in TikTok required. Skills: Storyboarding, Sound Designing, Rough Cut \
            & Sequencing, Filming. Budget: $100-150/hour.",
    },
    PresetJob {
        title: "Chief Operations Officer - Productivity",
        description: "Hiring a Chief Operation Officer to run channel in productivity. Background \
            in Strategy & Consulting, Business operations or Development. Needs high energy and \
            passion for educational content. No budget limitation. Willing to hire the best \
            talent for the role.",
    },
];
