//! Categorical encodings as lookup tables.
//!
//! The numeric code for each choice must be the one used when the
//! classifier was trained. Keeping the mapping as data means the form, the
//! CLI flags and the web API all encode through the same rows.

use crate::i18n::Locale;
use crate::schema::FeatureKey;

/// One selectable option and the code it encodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    pub code: i64,
    pub en: &'static str,
    pub id: &'static str,
}

impl ChoiceOption {
    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en,
            Locale::Id => self.id,
        }
    }
}

/// Ordered options for a two-way categorical field.
#[derive(Debug)]
pub struct ChoiceTable {
    pub name: &'static str,
    pub options: &'static [ChoiceOption],
}

/// `sex`: 1 = male, 0 = female.
pub static SEX: ChoiceTable = ChoiceTable {
    name: "sex",
    options: &[
        ChoiceOption {
            code: 1,
            en: "Male",
            id: "Pria",
        },
        ChoiceOption {
            code: 0,
            en: "Female",
            id: "Wanita",
        },
    ],
};

/// `fbs` and `exang`: 1 = yes, 0 = no.
pub static YES_NO: ChoiceTable = ChoiceTable {
    name: "yes_no",
    options: &[
        ChoiceOption {
            code: 0,
            en: "No",
            id: "Tidak",
        },
        ChoiceOption {
            code: 1,
            en: "Yes",
            id: "Ya",
        },
    ],
};

impl ChoiceTable {
    /// Encode a choice label (either locale, case-insensitive).
    pub fn encode(&self, label: &str) -> Option<i64> {
        let label = label.trim();
        self.options
            .iter()
            .find(|o| o.en.eq_ignore_ascii_case(label) || o.id.eq_ignore_ascii_case(label))
            .map(|o| o.code)
    }

    pub fn option_for(&self, code: i64) -> Option<&'static ChoiceOption> {
        self.options.iter().find(|o| o.code == code)
    }

    /// Display label for an encoded value.
    pub fn label_for(&self, code: i64, locale: Locale) -> Option<&'static str> {
        self.option_for(code).map(|o| o.label(locale))
    }

    pub fn contains_code(&self, code: i64) -> bool {
        self.option_for(code).is_some()
    }

    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.options.iter().map(|o| o.code)
    }

    /// Position of `code` in presentation order.
    pub fn position(&self, code: i64) -> Option<usize> {
        self.options.iter().position(|o| o.code == code)
    }

    pub fn describe(&self) -> String {
        let labels: Vec<&str> = self.options.iter().map(|o| o.en).collect();
        labels.join(" | ")
    }

    pub fn describe_codes(&self) -> String {
        let rows: Vec<String> = self
            .options
            .iter()
            .map(|o| format!("{}={}", o.en, o.code))
            .collect();
        format!("{{{}}}", rows.join(", "))
    }
}

/// Table governing a key, if the key is a two-way categorical field.
pub fn choice_table(key: FeatureKey) -> Option<&'static ChoiceTable> {
    key.spec().choice_table()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_encoding() {
        assert_eq!(SEX.encode("Male"), Some(1));
        assert_eq!(SEX.encode("Female"), Some(0));
        assert_eq!(SEX.encode("  male "), Some(1));
        assert_eq!(SEX.encode("Pria"), Some(1));
        assert_eq!(SEX.encode("Wanita"), Some(0));
        assert_eq!(SEX.encode("M"), None);
        assert_eq!(SEX.encode("1"), None);
    }

    #[test]
    fn test_yes_no_encoding() {
        assert_eq!(YES_NO.encode("Yes"), Some(1));
        assert_eq!(YES_NO.encode("no"), Some(0));
        assert_eq!(YES_NO.encode("Ya"), Some(1));
        assert_eq!(YES_NO.encode("Tidak"), Some(0));
        assert_eq!(YES_NO.encode("maybe"), None);
    }

    #[test]
    fn test_every_label_decodes_to_itself() {
        for table in [&SEX, &YES_NO] {
            for option in table.options {
                for locale in [Locale::En, Locale::Id] {
                    let label = option.label(locale);
                    let code = table.encode(label).unwrap();
                    assert_eq!(table.label_for(code, locale), Some(label));
                }
            }
        }
    }

    #[test]
    fn test_choice_table_lookup_by_key() {
        assert_eq!(choice_table(FeatureKey::Sex).map(|t| t.name), Some("sex"));
        assert_eq!(choice_table(FeatureKey::Fbs).map(|t| t.name), Some("yes_no"));
        assert_eq!(choice_table(FeatureKey::Exang).map(|t| t.name), Some("yes_no"));
        assert!(choice_table(FeatureKey::Cp).is_none());
    }

    #[test]
    fn test_describe() {
        assert_eq!(SEX.describe(), "Male | Female");
        assert_eq!(YES_NO.describe_codes(), "{No=0, Yes=1}");
        assert_eq!(SEX.position(0), Some(1));
    }
}
