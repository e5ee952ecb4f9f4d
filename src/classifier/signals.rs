//! Structural and metadata signals read from a rendered document
//!
//! Extraction is script-free: every signal is a CSS-selector or JSON-LD query against the
//! loaded document.

use crate::classifier::pattern::ProductPatterns;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Texts that identify a purchase control
const ADD_TO_CART_TEXTS: &[&str] = &[
    "add to cart",
    "add to bag",
    "add to basket",
    "add to trolley",
    "buy now",
];

const PRODUCT_SCHEMA_TYPES: &[&str] = &["product", "productgroup"];

const CART_CONTROL_SELECTORS: &[&str] = &[
    "button",
    "input[type='submit']",
    "input[type='button']",
    "a",
];

const CART_HOOK_SELECTORS: &[&str] = &[
    "[name='add-to-cart']",
    "[id*='add-to-cart']",
    "[class*='add-to-cart']",
    "[data-action='add-to-cart']",
    "form[action*='/cart/add']",
];

const TITLE_SELECTORS: &[&str] = &[
    "h1",
    "[itemprop='name']",
    "[class*='product-title']",
    "[class*='product-name']",
];

const PRICE_SELECTORS: &[&str] = &[
    "[itemprop='price']",
    "meta[property='product:price:amount']",
    "[class*='price']",
    "[id*='price']",
    "[data-price]",
];

const OPTION_SELECTORS: &[&str] = &[
    "select[name*='size']",
    "select[name*='color']",
    "select[name*='colour']",
    "[class*='swatch']",
    "[class*='variant']",
    "[class*='size-selector']",
];

const GALLERY_SELECTORS: &[&str] = &[
    "[class*='gallery']",
    "[class*='product-image']",
    "[class*='product-media']",
    "[itemprop='image']",
];

const BREADCRUMB_SELECTORS: &[&str] = &[
    "[class*='breadcrumb']",
    "nav[aria-label*='readcrumb']",
    "[itemtype*='BreadcrumbList']",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "[itemprop='description']",
    "[class*='product-description']",
    "[id*='description']",
];

const REVIEW_SELECTORS: &[&str] = &[
    "[itemprop='aggregateRating']",
    "[itemprop='review']",
    "[class*='review']",
    "[id*='reviews']",
];

const RELATED_SELECTORS: &[&str] = &[
    "[class*='related']",
    "[class*='recommend']",
    "[class*='also-like']",
    "[class*='cross-sell']",
];

/// Features extracted from one rendered page, alive for a single classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    // Metadata signals
    pub structured_data_product: bool,
    pub microdata_product: bool,
    pub og_type_product: bool,

    // Structural signals
    pub title: bool,
    pub price: bool,
    pub add_to_cart: bool,
    pub options: bool,
    pub gallery: bool,
    pub breadcrumb: bool,
    pub description: bool,
    pub reviews: bool,
    pub related_products: bool,

    // URL-shape signals
    pub product_path: bool,
    pub product_query: bool,
}

impl Signals {
    /// True if any strong metadata signal is present
    pub fn has_strong_metadata(&self) -> bool {
        self.structured_data_product || self.microdata_product || self.og_type_product
    }
}

/// Extracts all signals from rendered HTML
pub fn extract_signals(html: &str, url: &Url, patterns: &ProductPatterns) -> Signals {
    let document = Html::parse_document(html);

    Signals {
        structured_data_product: has_structured_data_product(&document),
        microdata_product: any_match(&document, &["[itemtype*='schema.org/Product']"]),
        og_type_product: meta_content(&document, "og:type")
            .map(|t| t.to_lowercase().contains("product"))
            .unwrap_or(false),

        title: any_non_empty(&document, TITLE_SELECTORS)
            || meta_content(&document, "og:title").is_some(),
        price: has_price(&document),
        add_to_cart: has_add_to_cart(&document),
        options: any_match(&document, OPTION_SELECTORS),
        gallery: any_match(&document, GALLERY_SELECTORS),
        breadcrumb: any_match(&document, BREADCRUMB_SELECTORS),
        description: any_non_empty(&document, DESCRIPTION_SELECTORS),
        reviews: any_match(&document, REVIEW_SELECTORS),
        related_products: any_match(&document, RELATED_SELECTORS),

        product_path: patterns.matches_path(url),
        product_query: patterns.matches_query(url),
    }
}

fn select_all<'a>(document: &'a Html, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            found.extend(document.select(&selector));
        }
    }
    found
}

fn any_match(document: &Html, selectors: &[&str]) -> bool {
    selectors.iter().any(|raw| {
        Selector::parse(raw)
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false)
    })
}

fn any_non_empty(document: &Html, selectors: &[&str]) -> bool {
    select_all(document, selectors)
        .into_iter()
        .any(|el| !element_text(&el).is_empty() || el.value().attr("content").is_some())
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads `<meta property=... content=...>` (or `name=`) for Open Graph keys
fn meta_content(document: &Html, property: &str) -> Option<String> {
    let raw = format!(
        "meta[property='{0}'][content], meta[name='{0}'][content]",
        property
    );
    let selector = Selector::parse(&raw).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

/// A price element must carry a digit, either in its text or a `content`/`data-price` value
fn has_price(document: &Html) -> bool {
    select_all(document, PRICE_SELECTORS).into_iter().any(|el| {
        let attr_value = el
            .value()
            .attr("content")
            .or_else(|| el.value().attr("data-price"))
            .unwrap_or("");
        attr_value.chars().any(|c| c.is_ascii_digit())
            || element_text(&el).chars().any(|c| c.is_ascii_digit())
    })
}

fn has_add_to_cart(document: &Html) -> bool {
    if any_match(document, CART_HOOK_SELECTORS) {
        return true;
    }

    select_all(document, CART_CONTROL_SELECTORS)
        .into_iter()
        .any(|el| {
            let label = format!(
                "{} {}",
                element_text(&el),
                el.value().attr("value").unwrap_or("")
            )
            .to_lowercase();
            ADD_TO_CART_TEXTS.iter().any(|t| label.contains(t))
        })
}

fn has_structured_data_product(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return false;
    };

    document.select(&selector).any(|script| {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(value) => json_ld_has_product(&value),
            Err(e) => {
                tracing::trace!("Skipping unparseable JSON-LD block: {}", e);
                false
            }
        }
    })
}

/// Walks a JSON-LD value looking for a product `@type` (top-level arrays and `@graph` included)
fn json_ld_has_product(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Array(items) => items.iter().any(json_ld_has_product),
        serde_json::Value::Object(map) => {
            let typed_product = match map.get("@type") {
                Some(serde_json::Value::String(t)) => is_product_type(t),
                Some(serde_json::Value::Array(types)) => types
                    .iter()
                    .filter_map(|t| t.as_str())
                    .any(is_product_type),
                _ => false,
            };
            typed_product || map.get("@graph").map(json_ld_has_product).unwrap_or(false)
        }
        _ => false,
    }
}

fn is_product_type(t: &str) -> bool {
    let t = t.rsplit('/').next().unwrap_or(t).to_lowercase();
    PRODUCT_SCHEMA_TYPES.contains(&t.as_str())
}
