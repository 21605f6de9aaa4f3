// Geo lookup - turn free-text country input into an ISO 3166-1 alpha-2 code
use isocountry::CountryCode;

/// Everyday names that differ from the ISO entry.
const ALIASES: &[(&str, &str)] = &[
    ("usa", "US"),
    ("united states", "US"),
    ("america", "US"),
    ("united kingdom", "GB"),
    ("great britain", "GB"),
    ("britain", "GB"),
    ("england", "GB"),
    ("russia", "RU"),
    ("korea", "KR"),
    ("south korea", "KR"),
    ("north korea", "KP"),
    ("vietnam", "VN"),
    ("iran", "IR"),
    ("syria", "SY"),
    ("laos", "LA"),
    ("taiwan", "TW"),
    ("czech republic", "CZ"),
    ("czechia", "CZ"),
    ("ivory coast", "CI"),
    ("cote d'ivoire", "CI"),
    ("turkey", "TR"),
    ("turkiye", "TR"),
    ("swaziland", "SZ"),
    ("eswatini", "SZ"),
    ("cape verde", "CV"),
    ("burma", "MM"),
    ("brunei", "BN"),
    ("dr congo", "CD"),
    ("democratic republic of the congo", "CD"),
    ("uae", "AE"),
    ("macedonia", "MK"),
    ("north macedonia", "MK"),
    ("vatican", "VA"),
    ("vatican city", "VA"),
    ("palestine", "PS"),
];

/// Convert a country name or code to ISO alpha-2.
///
/// Empty input means worldwide. Any two-letter input is taken as a code and
/// upper-cased without checking it. Alpha-3 codes, ISO names, common aliases
/// and the leading part of qualified ISO names ("Bolivia" for "Bolivia
/// (Plurinational State of)") are matched case-insensitively; anything
/// unknown falls back to worldwide (`""`).
pub fn country_code(input: &str) -> String {
    let s = input.trim();
    if s.is_empty() {
        return String::new();
    }
    if s.chars().count() == 2 && s.chars().all(char::is_alphabetic) {
        return s.to_uppercase();
    }
    if let Ok(code) = CountryCode::for_alpha3(&s.to_uppercase()) {
        return code.alpha2().to_string();
    }

    let needle = s.to_lowercase();
    if let Some(code) = CountryCode::iter().find(|c| c.name().to_lowercase() == needle) {
        return code.alpha2().to_string();
    }
    if let Some((_, alpha2)) = ALIASES.iter().find(|(alias, _)| *alias == needle) {
        return alpha2.to_string();
    }

    CountryCode::iter()
        .find(|c| short_name(c.name()).to_lowercase() == needle)
        .map(|c| c.alpha2().to_string())
        .unwrap_or_default()
}

/// ISO name for an alpha-2 code, if known.
pub fn country_name(alpha2: &str) -> Option<&'static str> {
    CountryCode::for_alpha2(&alpha2.to_uppercase())
        .ok()
        .map(|c| c.name())
}

fn short_name(name: &str) -> &str {
    name.split([',', '(']).next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_lookup() {
        assert_eq!(country_code(""), "");
        assert_eq!(country_code("   "), "");
        assert_eq!(country_code("ng"), "NG");
        assert_eq!(country_code(" Nigeria "), "NG");
        assert_eq!(country_code("united states"), "US");
        assert_eq!(country_code("DEU"), "DE");
        assert_eq!(country_code("deu"), "DE");
        assert_eq!(country_code("UK"), "UK");
        assert_eq!(country_code("Great Britain"), "GB");
        assert_eq!(country_code("South Korea"), "KR");
        assert_eq!(country_code("Atlantis"), "");
    }

    #[test]
    fn test_country_code_from_qualified_iso_name() {
        assert_eq!(country_code("Bolivia"), "BO");
        assert_eq!(country_code("tanzania"), "TZ");
    }

    #[test]
    fn test_country_name() {
        assert_eq!(country_name("ng"), Some("Nigeria"));
        assert_eq!(country_name("ZZ"), None);
    }
}
