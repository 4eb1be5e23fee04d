// src/coach/prompts.rs - Coaching modes and their instruction templates

use serde::{Deserialize, Serialize};

const QUALITATIVE_PROMPT: &str = "\
You are a supply chain agent helping me play a role-playing game.
The game has four players: retailer / wholesaler / distributor / factory.
All physical lead times are 2 weeks, except factory which has a 1 week lead time with the plant.
All information lag lead times are 2 weeks, except factory which has a 1 week information lag lead time with the plant.
The holding cost is $0.5 per case per week and the backorder cost is $1 per case per week.
There is a steady demand of 4 cases each week, so the pipeline is fully loaded with 4 cases at every stage.
The starting inventory position is 12 cases.
Each week the user will give you the downstream customer's demand.
You will tell me some qualitative reasoning for what I should order (do not suggest any order quantity number). The user can override your recommendation.
";

const QUANTITATIVE_PROMPT: &str = "\
You are a supply chain agent helping me play a role-playing game.
The game has four players: retailer / wholesaler / distributor / factory.
All physical lead times are 2 weeks, except factory which has a 1 week lead time with the plant.
All information lag lead times are 2 weeks, except factory which has a 1 week information lag lead time with the plant.
The holding cost is $0.5 per case per week and the backorder cost is $1 per case per week.
There is a steady demand of 4 cases each week, so the pipeline is fully loaded with 4 cases at every stage.
The starting inventory position is 12 cases.
Each week the user will give you the downstream customer's demand.
You will tell the user your recommended order quantity.
The user can override your recommendation.
";

/// The standing message every new session opens with.
pub const GREETING: &str = "Hello, I am your Beer Game coach.";

/// The four supply-chain positions offered in quantitative mode.
pub const ROLE_OPTIONS: [&str; 4] = ["Retailer", "Wholesaler", "Distributor", "Factory"];

/// Which kind of guidance the assistant gives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachingMode {
    /// Directional reasoning only, never an order quantity.
    Qualitative,
    /// Concrete order-quantity recommendations.
    #[default]
    Quantitative,
}

impl CoachingMode {
    /// Identifier written to the `Mode` metadata row.
    pub fn key(self) -> &'static str {
        match self {
            CoachingMode::Qualitative => "BeerGameQualitative",
            CoachingMode::Quantitative => "BeerGameQuantitative",
        }
    }

    /// Short form used in blob names.
    pub fn slug(self) -> &'static str {
        match self {
            CoachingMode::Qualitative => "qualitative",
            CoachingMode::Quantitative => "quantitative",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CoachingMode::Qualitative => "Beer Game qualitative coach",
            CoachingMode::Quantitative => "Beer Game quantitative coach",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            CoachingMode::Qualitative => QUALITATIVE_PROMPT,
            CoachingMode::Quantitative => QUANTITATIVE_PROMPT,
        }
    }

    pub fn requires_section(self) -> bool {
        matches!(self, CoachingMode::Quantitative)
    }

    /// Quantitative sessions pin the role once the student starts chatting
    /// and only accept one of [`ROLE_OPTIONS`].
    pub fn locks_role(self) -> bool {
        matches!(self, CoachingMode::Quantitative)
    }

    pub fn always_autosaves(self) -> bool {
        matches!(self, CoachingMode::Quantitative)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qualitative" | "beergamequalitative" => Some(CoachingMode::Qualitative),
            "quantitative" | "beergamequantitative" => Some(CoachingMode::Quantitative),
            _ => None,
        }
    }
}

impl std::fmt::Display for CoachingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Match `role` against [`ROLE_OPTIONS`], ignoring case and surrounding space.
pub fn canonical_role(role: &str) -> Option<&'static str> {
    let role = role.trim();
    ROLE_OPTIONS
        .iter()
        .copied()
        .find(|r| r.eq_ignore_ascii_case(role))
}

/// Append role framing to the base template. No role means the base as-is.
pub fn build_system_prompt(base_prompt: &str, role: &str) -> String {
    let role_text = role.trim();
    if role_text.is_empty() {
        return base_prompt.to_string();
    }
    format!(
        "{base_prompt}\n\n\
         User role in Beer Game: {role_text}.\n\
         Tailor all guidance to this role's decisions, responsibilities, and tradeoffs."
    )
}

pub fn build_welcome_message(role: &str) -> String {
    let role_text = role.trim();
    format!(
        "You are the '{role_text}'. I will help you with making decisions. \
         Please share the current round context, incoming demand, inventory, backlog, and pipeline orders."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_identifiers() {
        assert_eq!(CoachingMode::Quantitative.key(), "BeerGameQuantitative");
        assert_eq!(CoachingMode::Qualitative.key(), "BeerGameQualitative");
        assert_eq!(CoachingMode::Quantitative.slug(), "quantitative");
        assert_eq!(format!("{}", CoachingMode::Qualitative), "qualitative");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(
            CoachingMode::parse("Quantitative"),
            Some(CoachingMode::Quantitative)
        );
        assert_eq!(
            CoachingMode::parse("BeerGameQualitative"),
            Some(CoachingMode::Qualitative)
        );
        assert_eq!(CoachingMode::parse("numeric"), None);
    }

    #[test]
    fn test_templates_differ_on_quantity_advice() {
        assert!(CoachingMode::Quantitative
            .prompt()
            .contains("recommended order quantity"));
        assert!(CoachingMode::Qualitative
            .prompt()
            .contains("do not suggest any order quantity number"));
    }

    #[test]
    fn test_canonical_role() {
        assert_eq!(canonical_role(" retailer "), Some("Retailer"));
        assert_eq!(canonical_role("FACTORY"), Some("Factory"));
        assert_eq!(canonical_role("Brewer"), None);
        assert_eq!(canonical_role(""), None);
    }

    #[test]
    fn test_system_prompt_without_role_is_base() {
        assert_eq!(build_system_prompt("BASE", ""), "BASE");
        assert_eq!(build_system_prompt("BASE", "   "), "BASE");
    }

    #[test]
    fn test_system_prompt_with_role() {
        let p = build_system_prompt("BASE", " Wholesaler ");
        assert_eq!(
            p,
            "BASE\n\nUser role in Beer Game: Wholesaler.\n\
             Tailor all guidance to this role's decisions, responsibilities, and tradeoffs."
        );
    }

    #[test]
    fn test_welcome_mentions_role() {
        let w = build_welcome_message("Distributor");
        assert!(w.starts_with("You are the 'Distributor'."));
        assert!(w.contains("pipeline orders"));
    }
}
