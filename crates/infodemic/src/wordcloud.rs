//! Frequency-weighted word cloud.
//!
//! Terms are counted from the cleaned token lists of the preprints.
//! With collocations enabled, adjacent token pairs that occur together
//! significantly more often than chance become terms of their own. The layout places terms
//! by decreasing frequency along an Archimedean spiral starting at the
//! center of the canvas, shrinking the font when a term doesn't fit.

use std::collections::BTreeMap;
use std::fmt::Write;

use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::config::WordsConfig;
use crate::utils::escape_xml;

const PALETTE: &[&str] = &[
    "#1b4965", "#5fa8d3", "#ca6702", "#9b2226", "#005f73", "#0a9396",
    "#bb3e03", "#6a4c93",
];

/// A term and its number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Term {
    pub(crate) text: String,
    pub(crate) count: u64,
}

/// Counts the tokens of all documents, most frequent first (ties in
/// alphabetical order).
pub(crate) fn frequencies(documents: &[Vec<String>]) -> Vec<Term> {
    let counts = documents.iter().flatten().fold(
        HashMap::<&str, u64>::new(),
        |mut acc, token| {
            acc.entry(token.as_str())
                .and_modify(|cnt| *cnt += 1)
                .or_insert(1);
            acc
        },
    );

    sorted(counts.into_iter().map(|(text, count)| Term {
        text: text.to_string(),
        count,
    }))
}

fn sorted<I: Iterator<Item = Term>>(terms: I) -> Vec<Term> {
    let mut terms: Vec<Term> = terms.collect();
    terms.sort_by(|a, b| b.count.cmp(&a.count).then(a.text.cmp(&b.text)));
    terms
}

/// Binomial log-likelihood `k ln(p) + (n - k) ln(1 - p)`.
fn log_l(k: f64, n: f64, p: f64) -> f64 {
    k * p.max(1e-10).ln() + (n - k) * (1.0 - p).max(1e-10).ln()
}

/// Dunning's log-likelihood ratio of a bigram.
///
/// `c12` is the bigram count, `c1` and `c2` the counts of its first
/// and second word and `n` the total number of tokens.
pub(crate) fn collocation_score(c12: u64, c1: u64, c2: u64, n: u64) -> f64 {
    if n <= c1 || n <= c2 {
        return 0.0;
    }

    let (c12, c1, c2, n) = (c12 as f64, c1 as f64, c2 as f64, n as f64);
    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);

    let score = log_l(c12, c1, p) + log_l(c2 - c12, n - c1, p)
        - log_l(c12, c1, p1)
        - log_l(c2 - c12, n - c1, p2);

    -2.0 * score
}

/// Returns the bigrams scoring above `threshold`. Pairs never span two
/// documents.
fn collocations(
    documents: &[Vec<String>],
    threshold: f64,
) -> HashSet<(&str, &str)> {
    let n = documents.iter().map(Vec::len).sum::<usize>() as u64;
    let unigrams = documents.iter().flatten().fold(
        HashMap::<&str, u64>::new(),
        |mut acc, token| {
            *acc.entry(token.as_str()).or_insert(0) += 1;
            acc
        },
    );

    let bigrams = documents
        .iter()
        .flat_map(|tokens| tokens.windows(2))
        .filter(|pair| pair[0] != pair[1])
        .fold(HashMap::<(&str, &str), u64>::new(), |mut acc, pair| {
            *acc.entry((pair[0].as_str(), pair[1].as_str())).or_insert(0) +=
                1;
            acc
        });

    bigrams
        .into_iter()
        .filter(|((first, second), count)| {
            collocation_score(*count, unigrams[first], unigrams[second], n)
                > threshold
        })
        .map(|(pair, _)| pair)
        .collect()
}

/// Counts the tokens and merges significant bigrams into phrases.
///
/// Each document is read left to right; a pair of adjacent tokens
/// forming a collocation is counted as one phrase and neither token is
/// counted again, neither as a word nor as part of the next pair.
pub(crate) fn frequencies_with_collocations(
    documents: &[Vec<String>],
    threshold: f64,
) -> Vec<Term> {
    let phrases = collocations(documents, threshold);
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for tokens in documents {
        let mut i = 0;
        while i < tokens.len() {
            let pair = tokens
                .get(i + 1)
                .map(|next| (tokens[i].as_str(), next.as_str()))
                .filter(|pair| phrases.contains(pair));

            match pair {
                Some((first, second)) => {
                    *counts.entry(format!("{first} {second}")).or_insert(0) +=
                        1;
                    i += 2;
                }
                None => {
                    *counts.entry(tokens[i].clone()).or_insert(0) += 1;
                    i += 1;
                }
            }
        }
    }

    sorted(counts.into_iter().map(|(text, count)| Term { text, count }))
}

/// Counts the tokens as configured, with or without collocations.
pub(crate) fn terms(
    documents: &[Vec<String>],
    config: &WordsConfig,
) -> Vec<Term> {
    if config.collocations {
        frequencies_with_collocations(documents, config.collocation_threshold)
    } else {
        frequencies(documents)
    }
}

/// A term placed on the canvas. `(x, y)` is the top-left corner of
/// its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placement {
    pub(crate) text: String,
    pub(crate) count: u64,
    pub(crate) font_size: f64,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Placement {
    fn overlaps(&self, x: f64, y: f64, width: f64, height: f64) -> bool {
        x < self.x + self.width
            && self.x < x + width
            && y < self.y + self.height
            && self.y < y + height
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) max_font_size: f64,
    pub(crate) min_font_size: f64,
    pub(crate) max_words: usize,
    /// Weight of the frequency on the font size, between `0` (all
    /// terms equally large) and `1` (proportional to frequency).
    pub(crate) relative_scaling: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            max_font_size: 72.0,
            min_font_size: 8.0,
            max_words: 200,
            relative_scaling: 0.5,
        }
    }
}

/// Approximate extent of a text in a sans-serif font.
#[inline]
fn text_box(text: &str, font_size: f64) -> (f64, f64) {
    (0.6 * font_size * text.chars().count() as f64, font_size)
}

impl Layout {
    /// Places the terms (expected most frequent first).
    ///
    /// Font sizes never grow from one term to the next, so the size of
    /// a placed term is monotonic in its frequency. Terms that don't
    /// fit at the minimal font size are dropped.
    pub(crate) fn place(&self, terms: &[Term]) -> Vec<Placement> {
        let mut placed: Vec<Placement> = vec![];
        let Some(max_count) = terms.first().map(|term| term.count as f64)
        else {
            return placed;
        };

        let mut last_size = self.max_font_size;

        for term in terms.iter().take(self.max_words) {
            let ratio = term.count as f64 / max_count;
            let mut font_size = (self.max_font_size
                * (self.relative_scaling * ratio
                    + (1.0 - self.relative_scaling)))
                .min(last_size);

            while font_size >= self.min_font_size {
                if let Some((x, y, width, height)) =
                    self.find_position(&placed, &term.text, font_size)
                {
                    placed.push(Placement {
                        text: term.text.clone(),
                        count: term.count,
                        font_size,
                        x,
                        y,
                        width,
                        height,
                    });
                    last_size = font_size;
                    break;
                }

                font_size -= 2.0;
            }

            if font_size < self.min_font_size {
                log::debug!("no room for term '{}'", term.text);
            }
        }

        placed
    }

    fn find_position(
        &self,
        placed: &[Placement],
        text: &str,
        font_size: f64,
    ) -> Option<(f64, f64, f64, f64)> {
        let (width, height) = text_box(text, font_size);
        if width > self.width || height > self.height {
            return None;
        }

        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let aspect = self.height / self.width;
        let max_radius = self.width.hypot(self.height) / 2.0;

        let mut step = 0u32;
        loop {
            let angle = f64::from(step) * 0.1;
            let radius = 3.0 * angle;
            if radius > max_radius {
                return None;
            }

            let x = cx + radius * angle.cos() - width / 2.0;
            let y = cy + radius * aspect * angle.sin() - height / 2.0;

            let inside = x >= 0.0
                && y >= 0.0
                && x + width <= self.width
                && y + height <= self.height;

            if inside && !placed.iter().any(|p| p.overlaps(x, y, width, height))
            {
                return Some((x, y, width, height));
            }

            step += 1;
        }
    }

    /// Renders placed terms as a standalone SVG image. Every term
    /// carries a title with its count, shown on hover.
    pub(crate) fn to_svg(&self, placements: &[Placement]) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
                viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" \
                role=\"img\" font-family=\"Helvetica, Arial, sans-serif\">\
                <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>",
            w = self.width,
            h = self.height,
        );

        for (idx, p) in placements.iter().enumerate() {
            let text = escape_xml(&p.text);
            let _ = write!(
                svg,
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{:.1}\" \
                    fill=\"{}\"><title>{text}: {}</title>{text}</text>",
                p.x,
                p.y + 0.8 * p.height,
                p.font_size,
                PALETTE[idx % PALETTE.len()],
                p.count,
            );
        }

        svg.push_str("</svg>");
        svg
    }
}
