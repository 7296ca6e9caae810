use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// CSS selector lists used by the DOM channel. Each list is tried in order
/// and the first selector that matches wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomSelectors {
    #[serde(default)]
    pub tile: Vec<String>,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub link: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
}

/// Everything a retailer adapter needs to know about one storefront.
///
/// Templates use `{query}`, `{path}`, `{keyword}`, `{reference}` and `{id}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerProfile {
    /// Stable lowercase identifier, e.g. `"zara"`.
    pub key: String,
    /// Display label forced onto every product's `brand`.
    pub label: String,
    /// Scheme and host used to absolutize relative URLs.
    pub base_origin: String,
    /// JSON search endpoint, when the retailer exposes one.
    #[serde(default)]
    pub api_search_url: Option<String>,
    /// HTML search results page.
    pub page_search_url: String,
    pub default_category: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Attribute keys holding this retailer's preferred phrasing, most
    /// preferred first. Defaults to `["{key}_search_string"]`.
    #[serde(default)]
    pub search_string_keys: Vec<String>,
    /// Image CDN template with a `{path}` placeholder.
    #[serde(default)]
    pub image_cdn: Option<String>,
    /// Product URL template built from an SEO keyword and base reference.
    #[serde(default)]
    pub seo_product_url: Option<String>,
    /// Product URL template built from a bare product id.
    #[serde(default)]
    pub id_product_url: Option<String>,
    #[serde(default)]
    pub dom: DomSelectors,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_enabled() -> bool {
    true
}

impl RetailerProfile {
    /// Attribute keys consulted first when resolving this retailer's query.
    #[must_use]
    pub fn search_keys(&self) -> Vec<String> {
        if self.search_string_keys.is_empty() {
            vec![format!("{}_search_string", self.key)]
        } else {
            self.search_string_keys.clone()
        }
    }

    /// Prefix a site-relative path with the base origin. Absolute and
    /// protocol-relative URLs are returned unchanged. Fragment-only links and
    /// other schemes (`javascript:`, `mailto:`, `data:`) give an empty string.
    #[must_use]
    pub fn absolutize(&self, href: &str) -> String {
        let href = href.trim();
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        if href.is_empty() || href.starts_with('#') || has_other_scheme(href) {
            return String::new();
        }
        if href.starts_with("//") {
            return format!("https:{href}");
        }
        let origin = self.base_origin.trim_end_matches('/');
        if href.starts_with('/') {
            format!("{origin}{href}")
        } else {
            format!("{origin}/{href}")
        }
    }

    /// The built-in Zara profile.
    #[must_use]
    pub fn zara() -> Self {
        Self {
            key: "zara".to_string(),
            label: "Zara".to_string(),
            base_origin: "https://www.zara.com".to_string(),
            api_search_url: Some(
                "https://www.zara.com/us/en/search?searchTerm={query}&section=WOMAN&ajax=true"
                    .to_string(),
            ),
            page_search_url: "https://www.zara.com/us/en/search?searchTerm={query}&section=WOMAN"
                .to_string(),
            default_category: "Women".to_string(),
            currency_symbol: "€".to_string(),
            search_string_keys: vec!["zara_search_string".to_string()],
            image_cdn: None,
            seo_product_url: Some(
                "https://www.zara.com/us/en/{keyword}-p{reference}.html".to_string(),
            ),
            id_product_url: Some("https://www.zara.com/us/en/product/{id}".to_string()),
            dom: DomSelectors {
                tile: vec![
                    "li.product-grid-product".to_string(),
                    "div.product-grid-product".to_string(),
                    "article".to_string(),
                ],
                name: vec![
                    ".product-grid-product-info__name".to_string(),
                    "h2".to_string(),
                    "h3".to_string(),
                ],
                price: vec![
                    ".money-amount__main".to_string(),
                    ".price-current__amount".to_string(),
                    "[class*='price']".to_string(),
                ],
                link: vec!["a[href*='/product/']".to_string(), "a".to_string()],
                image: vec!["img.media-image__image".to_string(), "img".to_string()],
            },
            enabled: true,
        }
    }

    /// The built-in H&M profile.
    #[must_use]
    pub fn hm() -> Self {
        Self {
            key: "hm".to_string(),
            label: "H&M".to_string(),
            base_origin: "https://www2.hm.com".to_string(),
            api_search_url: None,
            page_search_url: "https://www2.hm.com/en_us/search-results.html?q={query}"
                .to_string(),
            default_category: "Fashion".to_string(),
            currency_symbol: "$".to_string(),
            search_string_keys: vec!["hm_search_string".to_string()],
            image_cdn: Some(
                "https://lp2.hm.com/hmgoepprod?set=quality[79],source[/{path}],origin[dam],category[],type[DESCRIPTIVESTILLLIFE],res[m],hmver[2]&call=url[file:/product/main]"
                    .to_string(),
            ),
            seo_product_url: None,
            id_product_url: Some("https://www2.hm.com/en_us/productpage.{id}.html".to_string()),
            dom: DomSelectors {
                tile: vec![
                    "li.product-item".to_string(),
                    ".product-item".to_string(),
                    "[data-testid='product-item']".to_string(),
                    ".product-grid li".to_string(),
                    ".product-grid article".to_string(),
                ],
                name: vec![
                    ".item-heading a".to_string(),
                    ".item-heading".to_string(),
                    "h3".to_string(),
                    ".product-item-heading".to_string(),
                ],
                price: vec![
                    ".item-price .price-value".to_string(),
                    ".item-price".to_string(),
                    ".product-item-price".to_string(),
                    "[data-testid='product-price']".to_string(),
                ],
                link: vec![
                    ".item-heading a".to_string(),
                    "a.item-link".to_string(),
                    "a".to_string(),
                ],
                image: vec![
                    "img.item-image".to_string(),
                    ".product-item-image img".to_string(),
                    "img".to_string(),
                ],
            },
            enabled: true,
        }
    }
}

/// `true` for `scheme:...` references whose scheme is not http(s).
fn has_other_scheme(href: &str) -> bool {
    href.split_once(':').is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Zara and H&M, used when no retailers file is present.
#[must_use]
pub fn builtin_retailers() -> Vec<RetailerProfile> {
    vec![RetailerProfile::zara(), RetailerProfile::hm()]
}

#[derive(Debug, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerProfile>,
}

impl RetailersFile {
    /// Profiles with `enabled: true`.
    #[must_use]
    pub fn enabled(&self) -> Vec<RetailerProfile> {
        self.retailers.iter().filter(|r| r.enabled).cloned().collect()
    }
}

/// Load and validate the retailer profiles from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<RetailersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let retailers_file: RetailersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RetailersFileParse)?;

    validate_retailers(&retailers_file)?;

    Ok(retailers_file)
}

/// Like [`load_retailers`], but falls back to [`builtin_retailers`] when the
/// file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// validated.
pub fn load_retailers_or_builtin(path: &Path) -> Result<RetailersFile, ConfigError> {
    if path.exists() {
        load_retailers(path)
    } else {
        Ok(RetailersFile {
            retailers: builtin_retailers(),
        })
    }
}

fn validate_retailers(retailers_file: &RetailersFile) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();

    for retailer in &retailers_file.retailers {
        if retailer.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer label must be non-empty".to_string(),
            ));
        }

        let key = retailer.key.trim().to_lowercase();
        if key.is_empty() {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' has an empty key",
                retailer.label
            )));
        }

        if !seen_keys.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer key: '{}'",
                retailer.key
            )));
        }

        if !retailer.page_search_url.contains("{query}") {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' page_search_url must contain a {{query}} placeholder",
                retailer.key
            )));
        }

        if let Some(api) = &retailer.api_search_url {
            if !api.contains("{query}") {
                return Err(ConfigError::Validation(format!(
                    "retailer '{}' api_search_url must contain a {{query}} placeholder",
                    retailer.key
                )));
            }
        }

        if let Some(cdn) = &retailer.image_cdn {
            if !cdn.contains("{path}") {
                return Err(ConfigError::Validation(format!(
                    "retailer '{}' image_cdn must contain a {{path}} placeholder",
                    retailer.key
                )));
            }
        }
    }

    Ok(())
}
