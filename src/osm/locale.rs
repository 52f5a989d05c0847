use serde::Deserialize;

/// Output language for names and opening hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Uk,
    En,
}

/// OSM `opening_hours` tokens and their Ukrainian rendering
const UK_HOURS: &[(&str, &str)] = &[
    ("Mo", "Пн"),
    ("Tu", "Вт"),
    ("We", "Ср"),
    ("Th", "Чт"),
    ("Fr", "Пт"),
    ("Sa", "Сб"),
    ("Su", "Нд"),
    ("PH", "Свята"),
    ("off", "Вихідний"),
    ("24/7", "Цілодобово"),
];

const EN_HOURS: &[(&str, &str)] = &[
    ("Mo", "Mon"),
    ("Tu", "Tue"),
    ("We", "Wed"),
    ("Th", "Thu"),
    ("Fr", "Fri"),
    ("Sa", "Sat"),
    ("Su", "Sun"),
    ("PH", "Public holidays"),
    ("off", "Closed"),
    ("24/7", "Open 24/7"),
];

impl Locale {
    /// Tag holding the name in this language, preferred over plain `name`
    pub fn name_tag(self) -> &'static str {
        match self {
            Locale::Uk => "name:uk",
            Locale::En => "name:en",
        }
    }

    /// Name given to bakeries without any name tag
    pub fn unnamed(self) -> &'static str {
        match self {
            Locale::Uk => "Пекарня без назви",
            Locale::En => "Bakery without a name",
        }
    }

    pub fn hours_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::Uk => UK_HOURS,
            Locale::En => EN_HOURS,
        }
    }
}

/// Replace every day/holiday/closed/24-7 token in an `opening_hours` value
///
/// Single left-to-right pass: replacement text is never rescanned, so the
/// result does not depend on table order. Times and separators pass through.
pub fn localize_hours(raw: &str, table: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        match table.iter().find(|(token, _)| rest.starts_with(token)) {
            Some((token, replacement)) => {
                out.push_str(replacement);
                rest = &rest[token.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}
