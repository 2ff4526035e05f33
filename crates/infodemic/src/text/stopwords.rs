/// English stopwords, in normalized form (alphanumeric, lowercase).
pub(crate) const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also",
    "am", "an", "and", "any", "are", "arent", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "cant", "could", "couldnt", "did",
    "didnt", "do", "does", "doesnt", "doing", "dont", "down", "during",
    "each", "et", "etc", "few", "for", "from", "further", "had",
    "hadnt", "has", "hasnt", "have", "havent", "having", "he", "hed",
    "hell", "her", "here", "heres", "hers", "herself", "hes", "him",
    "himself", "his", "how", "hows", "however", "i", "id", "ie", "if",
    "ill", "im", "in", "into", "is", "isnt", "it", "its", "itself",
    "ive", "lets", "may", "me", "might", "more", "most", "must",
    "mustnt", "my", "myself", "no", "nor", "not", "of", "off", "on",
    "once", "only", "or", "other", "ought", "our", "ours", "ourselves",
    "out", "over", "own", "same", "shall", "shant", "she", "shed",
    "shell", "shes", "should", "shouldnt", "so", "some", "such",
    "than", "that", "thats", "the", "their", "theirs", "them",
    "themselves", "then", "there", "theres", "therefore", "these",
    "they", "theyd", "theyll", "theyre", "theyve", "this", "those",
    "though", "through", "thus", "to", "too", "under", "until", "up",
    "upon", "us", "using", "very", "via", "was", "wasnt", "we", "wed",
    "well", "were", "werent", "weve", "what", "whats", "when", "whens",
    "where", "wheres", "whether", "which", "while", "who", "whom",
    "whos", "why", "whys", "will", "with", "within", "without", "wont",
    "would", "wouldnt", "yet", "you", "youd", "youll", "your",
    "youre", "yours", "yourself", "yourselves", "youve",
];
