use crate::models::{non_empty, Candidate, SearchConfig};
use std::collections::HashMap;

/// Result of a deduplication pass
#[derive(Debug, Clone, Default)]
pub struct DedupResult {
    /// First occurrence of every signature, in input order
    pub unique: Vec<Candidate>,
    /// Later occurrences, marked `is_duplicate`
    pub duplicates: Vec<Candidate>,
}

/// Build the duplicate-detection signature of a candidate
///
/// Each present field becomes a tagged segment so a missing field can never
/// make two different records line up.
pub fn signature(candidate: &Candidate, config: &SearchConfig) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);

    if !candidate.title.is_empty() {
        let title: String = candidate
            .title
            .chars()
            .take(config.dedup_title_prefix_length)
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        parts.push(format!("t:{}", title));
    }

    if let Some(city) = non_empty(Some(&candidate.city)) {
        parts.push(format!("c:{}", city.to_lowercase()));
    }

    if let Some(price) = candidate.price_per_month.filter(|p| *p != 0.0 && p.is_finite()) {
        parts.push(format!("p:{}", round_price(price, config.dedup_price_rounding_unit)));
    }

    if let Some(phone) = non_empty(candidate.phone.as_deref()) {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        parts.push(format!("ph:{}", digits));
    }

    if let Some(email) = non_empty(candidate.email.as_deref()) {
        parts.push(format!("e:{}", email.to_lowercase()));
    }

    parts.join("|")
}

/// Round a price to the nearest multiple of `unit`, ties to even
fn round_price(price: f64, unit: f64) -> i64 {
    if unit <= 0.0 {
        return price.round_ties_even() as i64;
    }
    ((price / unit).round_ties_even() * unit) as i64
}

/// Remove listings that appear more than once across sources
///
/// The first occurrence of a signature wins; every later one is marked as a
/// duplicate. Untitled records and records with an empty signature are always
/// kept so the filter can reject each of them on its own.
pub fn remove_duplicates(candidates: Vec<Candidate>, config: &SearchConfig) -> DedupResult {
    tracing::info!("Checking for duplicates in {} listings", candidates.len());

    let mut seen: HashMap<String, usize> = HashMap::with_capacity(candidates.len());
    let mut result = DedupResult::default();

    for mut candidate in candidates {
        if candidate.title.trim().is_empty() {
            result.unique.push(candidate);
            continue;
        }

        let key = signature(&candidate, config);

        if key.is_empty() {
            result.unique.push(candidate);
            continue;
        }

        match seen.get(&key) {
            Some(&index) => {
                tracing::debug!(
                    title = %candidate.title,
                    platform = %candidate.platform,
                    original_platform = %result.unique[index].platform,
                    "Duplicate found"
                );
                candidate.is_duplicate = true;
                result.duplicates.push(candidate);
            }
            None => {
                seen.insert(key, result.unique.len());
                result.unique.push(candidate);
            }
        }
    }

    tracing::info!(
        "Found {} duplicates, {} unique listings",
        result.duplicates.len(),
        result.unique.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, platform: &str, price: f64, phone: &str) -> Candidate {
        Candidate::new(title, platform, &format!("http://{}.test", platform), "Berlin")
            .with_price(price)
            .with_phone(phone)
    }

    #[test]
    fn test_signature_normalization() {
        let config = SearchConfig::default();
        let candidate = Candidate::new("Nice Room, Berlin-Mitte!", "A", "http://a", "  Berlin ")
            .with_price(812.0)
            .with_phone("+49 (0) 123-456")
            .with_email(" Host@Example.COM ");

        assert_eq!(
            signature(&candidate, &config),
            "t:niceroomberlinmitte|c:berlin|p:800|ph:490123456|e:host@example.com"
        );
    }

    #[test]
    fn test_title_prefix_is_truncated() {
        let config = SearchConfig { dedup_title_prefix_length: 4, ..SearchConfig::default() };
        let a = Candidate::new("Room A", "A", "http://a", "Berlin");
        let b = Candidate::new("Room B", "B", "http://b", "Berlin");

        assert_eq!(signature(&a, &config), signature(&b, &config));
    }

    #[test]
    fn test_price_rounding_ties_to_even() {
        assert_eq!(round_price(825.0, 50.0), 800);
        assert_eq!(round_price(875.0, 50.0), 900);
        assert_eq!(round_price(830.0, 50.0), 850);
    }

    #[test]
    fn test_missing_fields_do_not_alias() {
        let config = SearchConfig::default();
        let priced = Candidate::new("Room", "A", "http://a", "").with_price(800.0);
        let phoned = Candidate::new("Room", "B", "http://b", "").with_phone("800");

        assert_ne!(signature(&priced, &config), signature(&phoned, &config));
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let config = SearchConfig::default();
        let listings = vec![
            listing("Nice Room in Berlin", "Platform A", 800.0, "+49123456789"),
            listing("Nice Room in Berlin", "Platform B", 800.0, "+49123456789"),
            listing("Different Room", "Platform C", 900.0, "+49987654321"),
        ];

        let result = remove_duplicates(listings, &config);

        assert_eq!(result.unique.len(), 2);
        assert_eq!(result.unique[0].platform, "Platform A");
        assert_eq!(result.unique[1].title, "Different Room");
        assert_eq!(result.duplicates.len(), 1);
        assert!(result.duplicates[0].is_duplicate);
        assert_eq!(result.duplicates[0].platform, "Platform B");
    }

    #[test]
    fn test_empty_signatures_never_collide() {
        let config = SearchConfig::default();
        let listings = vec![
            Candidate::new("", "A", "http://a", ""),
            Candidate::new("", "B", "http://b", ""),
        ];

        let result = remove_duplicates(listings, &config);
        assert_eq!(result.unique.len(), 2);
        assert!(result.duplicates.is_empty());
    }

    #[test]
    fn test_untitled_listings_are_not_matched() {
        let config = SearchConfig::default();
        let listings = vec![
            Candidate::new("", "A", "http://a", "Berlin").with_phone("1"),
            Candidate::new(" ", "B", "http://b", "Berlin").with_phone("1"),
        ];

        let result = remove_duplicates(listings, &config);

        assert_eq!(result.unique.len(), 2);
        assert!(result.duplicates.is_empty());
        assert!(result.unique.iter().all(|c| !c.is_duplicate));
    }
}
