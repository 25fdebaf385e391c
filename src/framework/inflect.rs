//! English singular/plural transforms for resource names.
//!
//! Only the last word of a snake_case name is inflected (`brake_pad` → `brake_pads`).
//! Both directions are idempotent for regular words, so `pluralize("wheels")`
//! stays `wheels` and `singularize("engine")` stays `engine`.

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "metadata",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("movie", "movies"),
    ("cactus", "cacti"),
];

const F_VES: &[(&str, &str)] = &[
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("wolf", "wolves"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("leaf", "leaves"),
    ("loaf", "loaves"),
    ("thief", "thieves"),
    ("calf", "calves"),
    ("elf", "elves"),
    ("self", "selves"),
];

const O_ES: &[&str] = &["hero", "potato", "tomato", "buffalo", "echo"];

const SIS: &[&str] = &[
    "analysis",
    "basis",
    "crisis",
    "diagnosis",
    "parenthesis",
    "synopsis",
    "thesis",
];

/// Returns the plural form of `word`.
pub fn pluralize(word: &str) -> String {
    inflect_last_word(word, pluralize_word)
}

/// Returns the singular form of `word`.
pub fn singularize(word: &str) -> String {
    inflect_last_word(word, singularize_word)
}

fn inflect_last_word(word: &str, inflect: fn(&str) -> String) -> String {
    match word.rsplit_once('_') {
        Some((head, last)) if !last.is_empty() => format!("{head}_{}", inflect(last)),
        _ => inflect(word),
    }
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower == *plural {
            return word.to_string();
        }
        if lower == *singular {
            return plural.to_string();
        }
    }
    if O_ES.contains(&lower.as_str()) {
        return format!("{word}es");
    }
    if lower.ends_with("quiz") {
        return format!("{word}zes");
    }
    if ["ss", "sh", "ch", "x", "z"].iter().any(|s| lower.ends_with(s))
        || ["status", "alias", "bus"].iter().any(|s| lower.ends_with(s))
    {
        return format!("{word}es");
    }
    if SIS.contains(&lower.as_str()) || lower.ends_with("axis") {
        return format!("{}es", &word[..word.len() - 2]);
    }
    if lower.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    for (singular, plural) in F_VES {
        if lower.ends_with(singular) {
            return format!("{}{plural}", &word[..word.len() - singular.len()]);
        }
    }
    format!("{word}s")
}

fn singularize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower == *singular {
            return word.to_string();
        }
        if lower == *plural {
            return singular.to_string();
        }
    }
    let cut = |n: usize| word[..word.len() - n].to_string();

    if lower.ends_with("quizzes") {
        return cut(3);
    }
    if SIS.iter().any(|s| lower == s.replace("sis", "ses")) {
        return format!("{}is", cut(2));
    }
    if O_ES.iter().any(|s| lower == format!("{s}es")) {
        return cut(2);
    }
    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", cut(3));
    }
    for (singular, plural) in F_VES {
        if lower.ends_with(plural) {
            return format!("{}{singular}", cut(plural.len()));
        }
    }
    if ["sses", "shes", "ches", "xes", "statuses", "aliases", "buses"]
        .iter()
        .any(|s| lower.ends_with(s))
    {
        return cut(2);
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.ends_with('s') {
        return cut(1);
    }
    word.to_string()
}
