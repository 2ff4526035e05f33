//! Text pipeline: from preprint title and abstract to cleaned tokens.

use std::fs::read_to_string;
use std::path::Path;

use hashbrown::HashSet;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use unicode_normalization::UnicodeNormalization;

use crate::config::WordsConfig;
use crate::prelude::*;
use crate::sources::preprints::Preprint;

mod lemma;
mod stopwords;

pub(crate) use lemma::lemmatize;

const PBAR_CLEAN: &str =
    "Cleaning preprint text: {human_pos} ({percent}%) | \
        elapsed: {elapsed_precise}{msg}";

/// Reduces a whitespace-separated token to its alphanumeric
/// characters, lowercased.
///
/// Lowercasing runs first, since it may produce combining marks
/// (`İ` becomes `i` followed by U+0307).
pub(crate) fn normalize(token: &str) -> String {
    token
        .to_lowercase()
        .nfc()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[derive(Debug, Default)]
pub(crate) struct Cleaner {
    stopwords: HashSet<String>,
    excluded: HashSet<String>,
}

impl Cleaner {
    pub(crate) fn new<I, J, S, T>(stopwords: I, excluded: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|word| normalize(word.as_ref()))
                .collect(),
            excluded: excluded
                .into_iter()
                .map(|word| normalize(word.as_ref()))
                .collect(),
        }
    }

    /// Builds a cleaner with the built-in English stopwords, the
    /// optional project stopword file and the excluded terms.
    pub(crate) fn from_config(
        config: &WordsConfig,
        base_dir: &Path,
    ) -> InfodemicResult<Self> {
        let mut stopwords: Vec<String> =
            stopwords::ENGLISH.iter().map(|s| s.to_string()).collect();

        if let Some(ref path) = config.stopwords {
            let content = read_to_string(base_dir.join(path))?;
            stopwords.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from),
            );
        }

        Ok(Self::new(stopwords, &config.excluded))
    }

    #[inline]
    fn keep(&self, token: &str) -> bool {
        token.chars().count() > 1
            && !self.stopwords.contains(token)
            && !self.excluded.contains(token)
    }

    /// Returns the cleaned tokens of a text in reading order.
    ///
    /// The filters run again on the lemmas, so that lemmatization can't
    /// reintroduce a stopword or an excluded term.
    pub(crate) fn clean(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(normalize)
            .filter(|token| self.keep(token))
            .map(|token| lemmatize(&token))
            .filter(|token| self.keep(token))
            .collect()
    }

    /// Cleans the text of all preprints. The order of the preprints is
    /// preserved; preprints without any token left are dropped.
    pub(crate) fn clean_all(
        &self,
        preprints: &[Preprint],
        quiet: bool,
    ) -> Vec<Vec<String>> {
        let pbar = ProgressBarBuilder::new(PBAR_CLEAN, quiet)
            .len(preprints.len() as u64)
            .build();

        let tokens: Vec<Vec<String>> = preprints
            .par_iter()
            .progress_with(pbar)
            .map(|preprint| self.clean(&preprint.text()))
            .collect();

        tokens.into_iter().filter(|tokens| !tokens.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    type TestResult = anyhow::Result<()>;

    fn cleaner() -> Cleaner {
        Cleaner::from_config(&WordsConfig::default(), Path::new("."))
            .unwrap()
    }

    #[test]
    fn normalize_strips_and_lowercases() {
        assert_eq!(normalize("SARS-CoV-2,"), "sarscov2");
        assert_eq!(normalize("(Hospitals)"), "hospitals");
        assert_eq!(normalize("R\u{0065}\u{0301}sum\u{00e9}"), "résumé");
        assert_eq!(normalize("--"), "");
    }

    #[test]
    fn normalize_drops_marks_from_lowercasing() {
        let token = normalize("İstanbul");
        assert_eq!(token, "istanbul");
        assert!(token.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn clean_removes_stopwords_and_excluded_terms() {
        let tokens = cleaner().clean(
            "The COVID-19 pandemic and SARS-CoV-2 vaccines: a study of \
                ICU admissions in 2020 (n = 5).",
        );

        assert_eq!(tokens, vec!["vaccine", "icu", "admission", "2020"]);
    }

    #[test]
    fn clean_filters_lemmas() {
        let cleaner = Cleaner::new(["the"], ["virus", "study"]);
        let tokens = cleaner.clean("Viruses, studies and other hosts");
        assert_eq!(tokens, vec!["and", "other", "host"]);
    }

    #[test]
    fn clean_invariants() {
        let config = WordsConfig::default();
        let cleaner = cleaner();
        let tokens = cleaner.clean(
            "Coronaviruses! COVID19 Patients' Outcomes; A B c D: \
                Ärzte und Pflegekräfte, SARS CoV 2 -- nCoV studies.",
        );

        assert!(!tokens.is_empty());
        for token in tokens.iter() {
            assert_eq!(token, &token.to_lowercase());
            assert!(token.chars().count() > 1);
            assert!(!config.excluded.contains(token));
        }
    }

    #[test]
    fn stopword_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("stop.txt"), "# extra\nTransmission\n")?;

        let config = WordsConfig {
            stopwords: Some("stop.txt".into()),
            ..Default::default()
        };
        let cleaner = Cleaner::from_config(&config, dir.path())?;
        assert_eq!(cleaner.clean("transmission rates"), vec!["rate"]);
        Ok(())
    }

    #[test]
    fn clean_all_keeps_preprint_order() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let preprints: Vec<Preprint> = ["alpha", "beta", "the", "delta"]
            .iter()
            .map(|word| Preprint {
                date,
                title: word.to_string(),
                abstract_: format!("{word}s"),
                doi: String::new(),
                category: String::new(),
            })
            .collect();

        let tokens = cleaner().clean_all(&preprints, true);
        assert_eq!(
            tokens,
            vec![
                vec!["alpha", "alpha"],
                vec!["beta", "beta"],
                vec!["delta", "delta"],
            ]
        );
    }
}
