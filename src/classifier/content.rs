//! Confidence-scored product classification of a rendered page
//!
//! Stage 1 returns immediately on strong metadata (structured data, microdata, Open Graph).
//! Stage 2 sums the weights of the structural and URL-shape signals present and compares the
//! total against a threshold.

use crate::classifier::pattern::ProductPatterns;
use crate::classifier::signals::{extract_signals, Signals};
use crate::config::ClassifierConfig;
use url::Url;

/// A weighted structural or URL-shape signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    AddToCart,
    Price,
    ProductPath,
    Title,
    Options,
    ProductQuery,
    Gallery,
    Breadcrumb,
    Description,
    Reviews,
    RelatedProducts,
}

impl Signal {
    pub fn present(&self, signals: &Signals) -> bool {
        match self {
            Self::AddToCart => signals.add_to_cart,
            Self::Price => signals.price,
            Self::ProductPath => signals.product_path,
            Self::Title => signals.title,
            Self::Options => signals.options,
            Self::ProductQuery => signals.product_query,
            Self::Gallery => signals.gallery,
            Self::Breadcrumb => signals.breadcrumb,
            Self::Description => signals.description,
            Self::Reviews => signals.reviews,
            Self::RelatedProducts => signals.related_products,
        }
    }
}

/// Scoring rule for stage 2
///
/// A purchase control is the most reliable single signal. Alone it stays under the default
/// threshold; paired with a price, a title or an option selector it clears it.
///
/// `ProductPath` and `ProductQuery` use the same rules as the pattern fast path, so a page
/// that reaches stage 2 during a crawl never carries them. They only count when `classify`
/// is called directly.
pub const SIGNAL_WEIGHTS: &[(Signal, u32)] = &[
    (Signal::AddToCart, 50),
    (Signal::Price, 20),
    (Signal::ProductPath, 15),
    (Signal::Title, 10),
    (Signal::Options, 10),
    (Signal::ProductQuery, 10),
    (Signal::Gallery, 5),
    (Signal::Breadcrumb, 5),
    (Signal::Description, 5),
    (Signal::Reviews, 5),
    (Signal::RelatedProducts, 5),
];

pub const DEFAULT_THRESHOLD: u32 = 60;

/// Sums the weights of every signal present
pub fn score(signals: &Signals) -> u32 {
    SIGNAL_WEIGHTS
        .iter()
        .filter(|(signal, _)| signal.present(signals))
        .map(|(_, weight)| weight)
        .sum()
}

/// Which stage decided a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Metadata,
    Structural,
}

/// Outcome of one content classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_product: bool,
    pub stage: Stage,
    /// Stage 2 score; zero when stage 1 decided
    pub score: u32,
}

/// Two-stage product classifier over rendered HTML
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    patterns: ProductPatterns,
    threshold: u32,
}

impl ContentClassifier {
    pub fn new(patterns: ProductPatterns, threshold: u32) -> Self {
        Self {
            patterns,
            threshold,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            ProductPatterns::from_config(config),
            config.confidence_threshold,
        )
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Decides from already-extracted signals
    pub fn decide(&self, signals: &Signals) -> Verdict {
        if signals.has_strong_metadata() {
            return Verdict {
                is_product: true,
                stage: Stage::Metadata,
                score: 0,
            };
        }

        let score = score(signals);
        Verdict {
            is_product: score >= self.threshold,
            stage: Stage::Structural,
            score,
        }
    }

    /// Classifies a rendered document loaded from `url`
    pub fn classify(&self, html: &str, url: &Url) -> Verdict {
        let signals = extract_signals(html, url, &self.patterns);
        let verdict = self.decide(&signals);
        tracing::trace!(
            "Classified {}: product={} stage={:?} score={}",
            url,
            verdict.is_product,
            verdict.stage,
            verdict.score
        );
        verdict
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(ProductPatterns::default(), DEFAULT_THRESHOLD)
    }
}
