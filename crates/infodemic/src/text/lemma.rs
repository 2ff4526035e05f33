//! Rule-based English lemmatizer.
//!
//! Irregular forms are looked up in a table; regular plural nouns and
//! third-person verbs lose their inflectional suffix, past forms and
//! participles lose `-ed` or `-ing`. Tokens containing digits are left
//! untouched.

fn irregular(token: &str) -> Option<&'static str> {
    let lemma = match token {
        // nouns
        "aches" => "ache",
        "analyses" => "analysis",
        "avalanches" => "avalanche",
        "axes" => "axis",
        "backaches" => "backache",
        "bacteria" => "bacterium",
        "bases" => "basis",
        "caches" => "cache",
        "children" => "child",
        "cliches" => "cliche",
        "crises" => "crisis",
        "criteria" => "criterion",
        "data" => "data",
        "diagnoses" => "diagnosis",
        "feet" => "foot",
        "geese" => "goose",
        "headaches" => "headache",
        "heartaches" => "heartache",
        "hypotheses" => "hypothesis",
        "indices" => "index",
        "lives" => "life",
        "matrices" => "matrix",
        "media" => "medium",
        "men" => "man",
        "mice" => "mouse",
        "news" => "news",
        "niches" => "niche",
        "phenomena" => "phenomenon",
        "prognoses" => "prognosis",
        "psyches" => "psyche",
        "series" => "series",
        "species" => "species",
        "statuses" => "status",
        "stomachaches" => "stomachache",
        "syntheses" => "synthesis",
        "teeth" => "tooth",
        "theses" => "thesis",
        "toothaches" => "toothache",
        "viruses" => "virus",
        "wives" => "wife",
        "women" => "woman",

        // words that only look inflected
        "ceiling" => "ceiling",
        "evening" => "evening",
        "finding" => "finding",
        "hundred" => "hundred",
        "morning" => "morning",
        "nothing" => "nothing",
        "setting" => "setting",
        "something" => "something",
        "united" => "united",

        // verbs
        "added" | "adding" => "add",
        "began" | "begun" => "begin",
        "biased" => "bias",
        "bought" => "buy",
        "brought" => "bring",
        "caught" => "catch",
        "caused" | "causing" => "cause",
        "chose" | "chosen" => "choose",
        "came" => "come",
        "completed" | "completing" => "complete",
        "controlled" | "controlling" => "control",
        "created" | "creating" => "create",
        "died" | "dying" => "die",
        "did" | "done" | "does" => "do",
        "drew" | "drawn" => "draw",
        "drove" | "driven" => "drive",
        "enrolled" | "enrolling" => "enroll",
        "explored" | "exploring" => "explore",
        "fell" | "fallen" => "fall",
        "felt" => "feel",
        "fought" => "fight",
        "found" => "find",
        "gave" | "given" => "give",
        "got" | "gotten" => "get",
        "goes" | "went" | "gone" => "go",
        "grew" | "grown" => "grow",
        "had" | "has" => "have",
        "held" => "hold",
        "ignored" | "ignoring" => "ignore",
        "kept" => "keep",
        "knew" | "known" => "know",
        "led" => "lead",
        "lost" => "lose",
        "lying" => "lie",
        "made" | "making" => "make",
        "meant" => "mean",
        "met" => "meet",
        "paid" => "pay",
        "ran" => "run",
        "restored" | "restoring" => "restore",
        "rose" | "risen" => "rise",
        "said" => "say",
        "saw" | "seen" => "see",
        "scored" | "scoring" => "score",
        "sent" => "send",
        "shaped" | "shaping" => "shape",
        "shown" => "show",
        "slept" => "sleep",
        "sought" => "seek",
        "spent" => "spend",
        "stood" => "stand",
        "stored" | "storing" => "store",
        "taken" | "taking" | "took" => "take",
        "taught" => "teach",
        "thought" => "think",
        "told" => "tell",
        "understood" => "understand",
        "used" | "using" => "use",
        "was" | "were" => "be",
        "won" => "win",
        "wrote" | "written" => "write",
        _ => return None,
    };

    Some(lemma)
}

#[inline]
fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Whether a stem lost a silent `e` together with `-ed` or `-ing`
/// (`reduc`, `improv`, `associat`, `includ`).
fn needs_e(stem: &[u8]) -> bool {
    let n = stem.len();
    let last = stem[n - 1];
    let prev = stem[n - 2];
    let before = if n > 2 { stem[n - 3] } else { b' ' };
    let consonant = |c: u8| c.is_ascii_lowercase() && !is_vowel(c);

    match (prev, last) {
        (_, b'c' | b'v' | b'u') => true,
        (b'i' | b'y', b'z') | (b'y', b's') => true,
        (b'a', b't') => !matches!(before, b'e' | b'o'),
        (b'o' | b'u', b't') => consonant(before),
        (b'a' | b'o' | b'i', b'd') | (b'u', b'd') => consonant(before),
        (b'a' | b'e' | b'i' | b'o', b's') => true,
        (b'r' | b'n' | b'p' | b'l', b's') => true,
        (p, b'l') => consonant(p) && !matches!(p, b'l' | b'r' | b'w'),
        (b'a' | b'u', b'r') => consonant(before),
        (b'i', b'r') => consonant(before) || before == b'u',
        (b'r' | b'd', b'g') => true,
        (b'a', b'g') => consonant(before),
        (b'n', b'g') => matches!(before, b'a' | b'e'),
        (b'i', b'n') => consonant(before),
        (b'i' | b'o', b'k') => consonant(before),
        (b'a' | b'i' | b'o', b'm') => consonant(before),
        (b'u', b'm') => before == b's',
        (b'i', b'b') => true,
        (p, b'z') => p != b'z',
        _ => false,
    }
}

/// Strips `-ed` or `-ing` and restores the verb stem, if the token is
/// a regular past form or participle.
fn strip_verb_suffix(token: &str) -> Option<String> {
    if !token.is_ascii() {
        return None;
    }

    if let Some(stem) = token.strip_suffix("ied") {
        if stem.len() > 1 {
            return Some(format!("{stem}y"));
        }
    }

    if token.ends_with("eed") {
        return None;
    }

    let stem = token
        .strip_suffix("ing")
        .or_else(|| token.strip_suffix("ed"))?;

    let bytes = stem.as_bytes();
    if bytes.len() < 3 || !bytes.iter().copied().any(is_vowel) {
        return None;
    }

    let n = bytes.len();
    let (last, prev) = (bytes[n - 1], bytes[n - 2]);
    let doubled = last == prev && !is_vowel(last);
    if doubled && !matches!(last, b'l' | b's' | b'z' | b'f') {
        return Some(stem[..n - 1].into());
    }

    if needs_e(bytes) {
        return Some(format!("{stem}e"));
    }

    Some(stem.into())
}

/// Returns the lemma of a normalized (lowercase, alphanumeric) token.
pub(crate) fn lemmatize(token: &str) -> String {
    if let Some(lemma) = irregular(token) {
        return lemma.into();
    }

    if token.chars().count() <= 3
        || token.chars().any(|c| c.is_ascii_digit())
    {
        return token.into();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        if stem.chars().count() > 1 {
            return format!("{stem}y");
        }
    }

    for suffix in ["sses", "xes", "ches", "shes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].into();
        }
    }

    if ["ss", "us", "is"].iter().any(|suffix| token.ends_with(suffix)) {
        return token.into();
    }

    if let Some(stem) = token.strip_suffix('s') {
        return stem.into();
    }

    strip_verb_suffix(token).unwrap_or_else(|| token.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lemmatize_regular_plurals() {
        assert_eq!(lemmatize("cases"), "case");
        assert_eq!(lemmatize("vaccines"), "vaccine");
        assert_eq!(lemmatize("infections"), "infection");
        assert_eq!(lemmatize("therapies"), "therapy");
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("approaches"), "approach");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("findings"), "finding");
    }

    #[test]
    fn lemmatize_che_nouns() {
        assert_eq!(lemmatize("headaches"), "headache");
        assert_eq!(lemmatize("caches"), "cache");
        assert_eq!(lemmatize("niches"), "niche");
        assert_eq!(lemmatize("axes"), "axis");
        assert_eq!(lemmatize("reaches"), "reach");
    }

    #[test]
    fn lemmatize_keeps_singulars() {
        assert_eq!(lemmatize("virus"), "virus");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("stress"), "stress");
        assert_eq!(lemmatize("test"), "test");
        assert_eq!(lemmatize("gas"), "gas");
        assert_eq!(lemmatize("icu"), "icu");
        assert_eq!(lemmatize("need"), "need");
        assert_eq!(lemmatize("proceed"), "proceed");
        assert_eq!(lemmatize("spring"), "spring");
        assert_eq!(lemmatize("hundred"), "hundred");
    }

    #[test]
    fn lemmatize_irregular_forms() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("women"), "woman");
        assert_eq!(lemmatize("analyses"), "analysis");
        assert_eq!(lemmatize("viruses"), "virus");
        assert_eq!(lemmatize("data"), "data");
        assert_eq!(lemmatize("series"), "series");
        assert_eq!(lemmatize("slept"), "sleep");
        assert_eq!(lemmatize("found"), "find");
        assert_eq!(lemmatize("taken"), "take");
    }

    #[test]
    fn lemmatize_past_forms() {
        assert_eq!(lemmatize("reported"), "report");
        assert_eq!(lemmatize("increased"), "increase");
        assert_eq!(lemmatize("observed"), "observe");
        assert_eq!(lemmatize("associated"), "associate");
        assert_eq!(lemmatize("estimated"), "estimate");
        assert_eq!(lemmatize("included"), "include");
        assert_eq!(lemmatize("compared"), "compare");
        assert_eq!(lemmatize("hospitalized"), "hospitalize");
        assert_eq!(lemmatize("stopped"), "stop");
        assert_eq!(lemmatize("studied"), "study");
        assert_eq!(lemmatize("assessed"), "assess");
        assert_eq!(lemmatize("treated"), "treat");
        assert_eq!(lemmatize("limited"), "limit");
    }

    #[test]
    fn lemmatize_participles() {
        assert_eq!(lemmatize("reducing"), "reduce");
        assert_eq!(lemmatize("improving"), "improve");
        assert_eq!(lemmatize("testing"), "test");
        assert_eq!(lemmatize("running"), "run");
        assert_eq!(lemmatize("modeling"), "model");
        assert_eq!(lemmatize("sampling"), "sample");
        assert_eq!(lemmatize("changing"), "change");
        assert_eq!(lemmatize("determining"), "determine");
        assert_eq!(lemmatize("remaining"), "remain");
        assert_eq!(lemmatize("spreading"), "spread");
        assert_eq!(lemmatize("using"), "use");
    }

    #[test]
    fn lemmatize_skips_numbers() {
        assert_eq!(lemmatize("covid19s"), "covid19s");
        assert_eq!(lemmatize("2020s"), "2020s");
    }
}
