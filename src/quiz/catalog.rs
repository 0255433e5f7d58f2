use super::answer::{code_from_flag_emoji, normalize};
use crate::constants::{CATALOG_TIMEOUT, CATALOG_URL, DEFAULT_BLACKLIST, USER_AGENT};
use ahash::{HashMap, HashMapExt, HashSet};
use serde::Deserialize;

/// (code, English name, German name)
const BUILTIN_COUNTRIES: [(&str, &str, &str); 20] = [
    ("AR", "Argentina", "Argentinien"),
    ("AT", "Austria", "Österreich"),
    ("AU", "Australia", "Australien"),
    ("BR", "Brazil", "Brasilien"),
    ("CA", "Canada", "Kanada"),
    ("CH", "Switzerland", "Schweiz"),
    ("CN", "China", "China"),
    ("DE", "Germany", "Deutschland"),
    ("ES", "Spain", "Spanien"),
    ("FR", "France", "Frankreich"),
    ("GB", "United Kingdom", "Vereinigtes Königreich"),
    ("IT", "Italy", "Italien"),
    ("JP", "Japan", "Japan"),
    ("KR", "South Korea", "Südkorea"),
    ("MX", "Mexico", "Mexiko"),
    ("NL", "Netherlands", "Niederlande"),
    ("NO", "Norway", "Norwegen"),
    ("PL", "Poland", "Polen"),
    ("SE", "Sweden", "Schweden"),
    ("US", "United States", "Vereinigte Staaten"),
];

const EXTRA_ALIASES: [(&str, &str); 9] = [
    ("usa", "US"),
    ("america", "US"),
    ("uk", "GB"),
    ("great britain", "GB"),
    ("grossbritannien", "GB"),
    ("england", "GB"),
    ("holland", "NL"),
    ("korea", "KR"),
    ("suedkorea", "KR"),
];

#[derive(Debug, Clone)]
pub struct Catalog {
    codes: Vec<String>,
    names: HashMap<String, String>,
    flag_urls: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RemoteCountry {
    #[serde(default)]
    cca2: String,
    #[serde(default)]
    name: RemoteName,
    #[serde(default)]
    translations: HashMap<String, RemoteName>,
    #[serde(default)]
    flags: RemoteFlags,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteName {
    #[serde(default)]
    common: String,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteFlags {
    #[serde(default)]
    png: String,
}

impl Catalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (code, name, german) in BUILTIN_COUNTRIES {
            catalog.insert(code, name, None);
            catalog.add_alias(german, code);
        }
        catalog.add_extra_aliases();
        catalog.codes.sort_unstable();
        catalog
    }

    /// Downloads the full country list. Entries without a two-letter code are skipped.
    pub async fn fetch() -> Result<Self, reqwest::Error> {
        let countries = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(CATALOG_TIMEOUT)
            .build()?
            .get(CATALOG_URL)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RemoteCountry>>()
            .await?;
        Ok(Self::from_remote(countries))
    }

    fn from_remote(countries: Vec<RemoteCountry>) -> Self {
        let mut catalog = Self::empty();
        for country in countries {
            let code = country.cca2.trim().to_uppercase();
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            let name = country.name.common.trim();
            let name = if name.is_empty() { code.as_str() } else { name };
            let flag_url = Some(country.flags.png.trim()).filter(|url| !url.is_empty());
            catalog.insert(&code, name, flag_url);
            if let Some(german) = country.translations.get("deu") {
                catalog.add_alias(&german.common, &code);
            }
        }
        if catalog.codes.is_empty() {
            return Self::builtin();
        }
        for (code, _, german) in BUILTIN_COUNTRIES {
            catalog.add_alias(german, code);
        }
        catalog.add_extra_aliases();
        catalog.codes.sort_unstable();
        catalog.codes.dedup();
        catalog
    }

    fn empty() -> Self {
        Self {
            codes: Vec::new(),
            names: HashMap::new(),
            flag_urls: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    fn insert(&mut self, code: &str, name: &str, flag_url: Option<&str>) {
        self.codes.push(code.to_owned());
        self.names.insert(code.to_owned(), name.to_owned());
        if let Some(url) = flag_url {
            self.flag_urls.insert(code.to_owned(), url.to_owned());
        }
        self.add_alias(name, code);
    }

    fn add_alias(&mut self, alias: &str, code: &str) {
        let alias = normalize(alias);
        if !alias.is_empty() && self.names.contains_key(code) {
            self.aliases.insert(alias, code.to_owned());
        }
    }

    fn add_extra_aliases(&mut self) {
        for (alias, code) in EXTRA_ALIASES {
            self.add_alias(alias, code);
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Sorted codes that are not blacklisted.
    pub fn pool(&self, blacklist: &HashSet<String>) -> Vec<&str> {
        self.codes
            .iter()
            .filter(|code| !blacklist.contains(*code))
            .map(String::as_str)
            .collect()
    }

    pub fn name_for<'a>(&'a self, code: &'a str) -> &'a str {
        self.names.get(code).map_or(code, String::as_str)
    }

    pub fn flag_url(&self, code: &str) -> String {
        self.flag_urls.get(code).cloned().unwrap_or_else(|| {
            format!("https://flagcdn.com/h240/{}.png", code.to_lowercase())
        })
    }

    /// Normalized strings accepted as a correct answer for `code`.
    pub fn answers_for(&self, code: &str) -> HashSet<String> {
        let mut answers = HashSet::default();
        answers.insert(normalize(code));
        answers.insert(normalize(self.name_for(code)));
        answers.extend(
            self.aliases
                .iter()
                .filter(|(_, mapped)| mapped.as_str() == code)
                .map(|(alias, _)| alias.clone()),
        );
        answers.retain(|answer| !answer.is_empty());
        answers
    }

    /// Resolves a flag emoji, code, name or alias to a known code.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        if let Some(code) = code_from_flag_emoji(query) {
            return self.names.get_key_value(&code).map(|(code, _)| code.as_str());
        }
        let normalized = normalize(query);
        if normalized.len() == 2 {
            let code = normalized.to_uppercase();
            if let Some((code, _)) = self.names.get_key_value(&code) {
                return Some(code.as_str());
            }
        }
        self.aliases.get(&normalized).map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn default_blacklist() -> HashSet<String> {
    DEFAULT_BLACKLIST.iter().map(|code| (*code).to_owned()).collect()
}

/// Parses a comma separated code list, keeping only two-letter codes.
pub fn parse_blacklist(list: &str) -> HashSet<String> {
    list.split(',')
        .map(|code| code.trim().to_uppercase())
        .filter(|code| code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves_names_codes_and_aliases() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.resolve("de"), Some("DE"));
        assert_eq!(catalog.resolve("Deutschland"), Some("DE"));
        assert_eq!(catalog.resolve("österreich"), Some("AT"));
        assert_eq!(catalog.resolve("USA"), Some("US"));
        assert_eq!(catalog.resolve("atlantis"), None);
        assert_eq!(catalog.resolve("\u{1F1EF}\u{1F1F5}"), Some("JP"));
        assert_eq!(catalog.name_for("KR"), "South Korea");
        assert_eq!(catalog.name_for("XX"), "XX");
    }

    #[test]
    fn answers_include_code_name_and_localized_aliases() {
        let answers = Catalog::builtin().answers_for("DE");
        for expected in ["de", "germany", "deutschland"] {
            assert!(answers.contains(expected), "missing {expected}");
        }
        assert!(!answers.contains("france"));
    }

    #[test]
    fn pool_skips_blacklisted_codes() {
        let catalog = Catalog::builtin();
        let blacklist = parse_blacklist("de, fr,xyz,1");
        assert_eq!(blacklist.len(), 2);
        let pool = catalog.pool(&blacklist);
        assert_eq!(pool.len(), 18);
        assert!(!pool.contains(&"DE"));
        assert!(pool.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn missing_flag_urls_fall_back_to_flagcdn() {
        assert_eq!(
            Catalog::builtin().flag_url("JP"),
            "https://flagcdn.com/h240/jp.png"
        );
    }

    #[test]
    fn remote_entries_are_merged_with_builtin_aliases() {
        let countries = vec![
            RemoteCountry {
                cca2: "de".into(),
                name: RemoteName {
                    common: "Germany".into(),
                },
                translations: [(
                    "deu".to_owned(),
                    RemoteName {
                        common: "Deutschland".into(),
                    },
                )]
                .into_iter()
                .collect(),
                flags: RemoteFlags {
                    png: "https://flags.example/de.png".into(),
                },
            },
            RemoteCountry {
                cca2: "XXX".into(),
                name: RemoteName::default(),
                translations: HashMap::new(),
                flags: RemoteFlags::default(),
            },
        ];
        let catalog = Catalog::from_remote(countries);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.flag_url("DE"), "https://flags.example/de.png");
        assert_eq!(catalog.resolve("deutschland"), Some("DE"));
        // aliases of countries missing from the download are dropped
        assert_eq!(catalog.resolve("usa"), None);
    }

    #[test]
    fn empty_download_keeps_builtin_catalog() {
        assert_eq!(Catalog::from_remote(Vec::new()).len(), 20);
    }
}
