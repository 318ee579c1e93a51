use serde::{Deserialize, Serialize};

/// Language used for violation messages and report summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLocale {
    #[default]
    En,
    Zh,
}

impl MessageLocale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en_us" | "english" => Some(Self::En),
            "zh" | "zh-cn" | "zh_cn" | "chinese" => Some(Self::Zh),
            _ => None,
        }
    }
}

/// Message template builder for violation texts.
/// Messages are compared by exact string equality when the report summary is
/// deduplicated, so every template must be a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageTemplates {
    locale: MessageLocale,
}

impl MessageTemplates {
    pub fn new(locale: MessageLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> MessageLocale {
        self.locale
    }

    /// Summary of a report without violations.
    pub fn passed(&self) -> String {
        match self.locale {
            MessageLocale::En => "contraindication check passed".to_string(),
            MessageLocale::Zh => "禁忌校验通过".to_string(),
        }
    }

    /// ALLERGY: patient allergy token found among the medicine's contraindications.
    pub fn allergy(&self, token: &str) -> String {
        match self.locale {
            MessageLocale::En => format!(
                "Patient allergy history conflicts with medicine contraindication: {token}"
            ),
            MessageLocale::Zh => format!("患者过敏史与药品禁忌冲突: {token}"),
        }
    }

    /// DISEASE: patient chronic disease found among the medicine's indications.
    pub fn disease(&self, token: &str) -> String {
        match self.locale {
            MessageLocale::En => format!(
                "Patient chronic disease requires attention to medicine contraindications: {token}"
            ),
            MessageLocale::Zh => format!("患者慢性病需要注意药品禁忌: {token}"),
        }
    }

    /// DOSAGE: the instruction itself reads as an overdose.
    pub fn overdose(&self, instruction: &str) -> String {
        match self.locale {
            MessageLocale::En => {
                format!("Dosage instruction suggests a possible overdose: {instruction}")
            }
            MessageLocale::Zh => format!("处方剂量说明疑似超量: {instruction}"),
        }
    }

    /// DOSAGE: day supply above the guideline's maximum.
    pub fn guideline_exceeded(&self, guideline: &str) -> String {
        match self.locale {
            MessageLocale::En => format!(
                "Prescribed daily regimen may exceed the guideline maximum: {guideline}"
            ),
            MessageLocale::Zh => format!("处方日剂量可能超过指南上限: {guideline}"),
        }
    }

    /// SPECIAL_POPULATION: pregnancy contraindication.
    pub fn pregnancy(&self, medicine: &str) -> String {
        match self.locale {
            MessageLocale::En => {
                format!("Not recommended for pregnant patients: {medicine}")
            }
            MessageLocale::Zh => format!("孕期患者不建议使用该药: {medicine}"),
        }
    }

    /// SPECIAL_POPULATION: blood-type restriction.
    pub fn blood_type(&self) -> String {
        match self.locale {
            MessageLocale::En => {
                "Medicine is restricted for this blood type; use with caution".to_string()
            }
            MessageLocale::Zh => "血型受限药品，需要谨慎使用".to_string(),
        }
    }

    /// INTERACTION: dangerous combination of two medicines.
    pub fn interaction(&self, first: &str, second: &str) -> String {
        match self.locale {
            MessageLocale::En => {
                format!("High-risk drug interaction in combination: {first} + {second}")
            }
            MessageLocale::Zh => format!("药物组合存在高危相互作用: {first} + {second}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_parsing() {
        assert_eq!(MessageLocale::parse("EN"), Some(MessageLocale::En));
        assert_eq!(MessageLocale::parse(" zh-CN "), Some(MessageLocale::Zh));
        assert_eq!(MessageLocale::parse("fr"), None);
    }

    #[test]
    fn messages_cite_their_subject() {
        let en = MessageTemplates::new(MessageLocale::En);
        assert!(en.allergy("penicillin").ends_with("penicillin"));
        assert!(en.interaction("meda", "medb").contains("meda + medb"));
        assert!(en.overdose("Overdose once daily").contains("overdose"));
    }

    #[test]
    fn chinese_templates() {
        let zh = MessageTemplates::new(MessageLocale::Zh);
        assert!(zh.allergy("青霉素").contains("过敏史"));
        assert!(zh.disease("高血压").contains("慢性病"));
        assert!(zh.overdose("超剂量").contains("超量"));
        assert!(zh.pregnancy("TestMed").contains("孕期"));
        assert!(zh.blood_type().contains("血型"));
        assert!(zh.interaction("a", "b").contains("相互作用"));
        assert_eq!(zh.passed(), "禁忌校验通过");
    }

    #[test]
    fn default_locale_is_english() {
        assert_eq!(MessageTemplates::default().locale(), MessageLocale::En);
        assert_eq!(MessageTemplates::default().passed(), "contraindication check passed");
    }
}
