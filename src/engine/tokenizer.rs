use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Tokens of this many characters or fewer are dropped
const MIN_TOKEN_CHARS: usize = 2;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    // Stored without apostrophes: punctuation is removed before matching,
    // so "don't" reaches the lookup as "dont". Contractions that collapse onto
    // ordinary words ("we'll", "she'll", "he'll", "she'd", "we'd", "i'll") are left out.
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","arent","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "cant","cannot","could","couldnt",
            "did","didnt","do","does","doesnt","doing","dont","down","during",
            "each","few","for","from","further",
            "had","hadnt","has","hasnt","have","havent","having","he","hed","hes","her","here","heres","hers","herself","him","himself","his","how","hows",
            "i","id","im","ive","if","in","into","is","isnt","it","its","itself",
            "lets","me","more","most","mustnt","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","shant","she","shes","should","shouldnt","so","some","such",
            "than","that","thats","the","their","theirs","them","themselves","then","there","theres","these","they","theyd","theyll","theyre","theyve","this","those","through","to","too",
            "under","until","up","very",
            "was","wasnt","we","were","weve","werent","what","whats","when","whens","where","wheres","which","while","who","whos","whom","why","whys","with","wont","would","wouldnt",
            "you","youd","youll","youre","youve","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Normalizes free text into the terms the vectorizer counts.
///
/// Lowercases, removes every character that is neither a word character nor
/// whitespace, splits on whitespace, then drops stop words and tokens of two
/// characters or fewer. Duplicates are kept in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS && !is_stopword(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input() {
        assert_eq!(tokenize("hello world"), vec!["hello", "world"]);
    }

    #[test]
    fn test_contraction_is_a_stopword_after_stripping() {
        assert_eq!(tokenize("Don't! Stop..."), vec!["stop"]);
        assert!(tokenize("isn't wasn't they're").is_empty());
    }

    #[test]
    fn test_contractions_colliding_with_words_are_kept() {
        assert_eq!(tokenize("We'll see the shell"), vec!["well", "see", "shell"]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("?!... ---").is_empty());
    }

    #[test]
    fn test_short_tokens_dropped() {
        assert_eq!(tokenize("go to ai lab now"), vec!["lab", "now"]);
    }

    #[test]
    fn test_punctuation_removed_not_split() {
        assert_eq!(tokenize("e-mail C++ rock&roll"), vec!["email", "rockroll"]);
    }

    #[test]
    fn test_duplicates_and_order_kept() {
        assert_eq!(
            tokenize("Pasta, PASTA and more pasta recipes"),
            vec!["pasta", "pasta", "pasta", "recipes"]
        );
    }

    #[test]
    fn test_underscores_and_digits_are_word_characters() {
        assert_eq!(tokenize("top_10 2024 hits"), vec!["top_10", "2024", "hits"]);
    }

    #[test]
    fn test_length_counts_characters() {
        // Two characters but four bytes
        assert!(tokenize("éé").is_empty());
        assert_eq!(tokenize("café"), vec!["café"]);
    }
}
