use crate::models::{RankingPolicy, Requester, StructuredResponse, TriState};

pub const NO_INTERNET_WARNING: &str = "No internet";
pub const NO_PARKING_WARNING: &str = "No parking";

/// Parse the first number in a free-text distance such as "12,5 km"
pub fn parse_distance_km(text: &str) -> Option<f64> {
    parse_number(text)
}

/// Parse the first amount in a free-text price such as "1.200,- €"
///
/// Currency markers are ignored; a lone separator followed by groups of
/// exactly three digits is read as a thousands separator unless the number
/// starts with zero.
pub fn parse_price(text: &str) -> Option<f64> {
    parse_number(text)
}

fn parse_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let token = token.trim_end_matches(['.', ',']);

    let normalized = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (decimal, thousands) = if dot > comma { ('.', ',') } else { (',', '.') };
            token.replace(thousands, "").replace(decimal, ".")
        }
        (Some(_), None) => normalize_single_separator(token, '.')?,
        (None, Some(_)) => normalize_single_separator(token, ',')?,
        (None, None) => token.to_string(),
    };

    normalized.parse().ok().filter(|n: &f64| n.is_finite())
}

/// Thousands grouping needs a leading group of 1-3 digits without a leading
/// zero and 3-digit groups after it. Anything else with a single separator is
/// a decimal number; with several separators it is unparsable.
fn normalize_single_separator(token: &str, separator: char) -> Option<String> {
    let groups: Vec<&str> = token.split(separator).collect();
    let leading = groups[0];
    let grouped = !leading.is_empty()
        && leading.len() <= 3
        && !leading.starts_with('0')
        && groups[1..].iter().all(|group| group.len() == 3);

    if grouped {
        Some(token.replace(separator, ""))
    } else if groups.len() > 2 {
        None
    } else {
        Some(token.replace(separator, "."))
    }
}

/// Calculate the ranking score of an available response
///
/// Scoring formula:
/// score = baseline
///     + distance band adjustment     # closer = higher
///     + price band adjustment        # cheaper relative to budget = higher
///     + internet / parking bonus     # only when affirmatively present
///     + urgency bonus                # flat, when the requester is urgent
///
/// Components whose text cannot be parsed contribute nothing.
pub fn calculate_score(
    response: &StructuredResponse,
    requester: &Requester,
    policy: &RankingPolicy,
    default_budget_max: u32,
) -> f64 {
    let mut score = policy.baseline;

    if let Some(distance) = response.distance_km.as_deref().and_then(parse_distance_km) {
        score += distance_adjustment(distance, policy);
    }

    if let Some(price) = response.price_per_month.as_deref().and_then(parse_price) {
        let budget = requester.effective_budget(default_budget_max) as f64;
        score += price_adjustment(price, budget, policy);
    }

    if response.internet_state() == TriState::Yes {
        score += policy.internet_bonus;
    }

    if response.parking_state() == TriState::Yes {
        score += policy.parking_bonus;
    }

    if requester.urgent {
        score += policy.urgency_bonus;
    }

    score
}

#[inline]
fn distance_adjustment(distance_km: f64, policy: &RankingPolicy) -> f64 {
    policy
        .distance_bands
        .iter()
        .find(|band| distance_km <= band.max_km)
        .map(|band| band.adjustment)
        .unwrap_or(policy.beyond_bands_adjustment)
}

#[inline]
fn price_adjustment(price: f64, budget: f64, policy: &RankingPolicy) -> f64 {
    if price <= budget * policy.comfortable_budget_ratio {
        policy.comfortable_adjustment
    } else if price <= budget {
        policy.within_budget_adjustment
    } else {
        policy.over_budget_adjustment
    }
}

/// Build the warning text of an available response, joined with "; "
pub fn generate_warnings(
    response: &StructuredResponse,
    requester: &Requester,
    policy: &RankingPolicy,
    default_budget_max: u32,
) -> String {
    let mut warnings = Vec::new();

    if let Some(distance) = response.distance_km.as_deref().and_then(parse_distance_km) {
        if distance > policy.far_warning_km {
            warnings.push(format!("Too far: {} km", distance));
        }
    }

    if let Some(price) = response.price_per_month.as_deref().and_then(parse_price) {
        let budget = requester.effective_budget(default_budget_max);
        if price > budget as f64 {
            warnings.push(format!("Over budget: {} > {}", price, budget));
        }
    }

    if response.internet_state() == TriState::No {
        warnings.push(NO_INTERNET_WARNING.to_string());
    }

    if response.parking_state() == TriState::No {
        warnings.push(NO_PARKING_WARNING.to_string());
    }

    warnings.join("; ")
}
