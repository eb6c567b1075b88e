//! Optional delivery location labels (office, meeting room, ...).

use super::LineExtractor;
use crate::models::config::LocationRule;
use crate::models::order::LocationTag;
use crate::ocr::OcrLine;

/// Records every line mentioning a configured location phrase.
pub struct LocationExtractor {
    rules: Vec<LocationRule>,
}

impl LocationExtractor {
    pub fn new(rules: &[LocationRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rule| LocationRule::new(rule.phrase.to_lowercase(), rule.label.clone()))
                .collect(),
        }
    }
}

impl LineExtractor for LocationExtractor {
    type Output = LocationTag;

    /// Each phrase found on a line yields its own tag, in rule order.
    fn extract_all(&self, lines: &[OcrLine]) -> Vec<LocationTag> {
        let mut tags = Vec::new();
        for (line_index, line) in lines.iter().enumerate() {
            let normalized = line.text.to_lowercase().replace('"', "");
            for rule in &self.rules {
                if normalized.contains(&rule.phrase) {
                    tags.push(LocationTag {
                        label: rule.label.clone(),
                        line_index,
                    });
                }
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExtractionConfig;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<OcrLine> {
        texts
            .iter()
            .map(|t| OcrLine::new(*t, [0.0, 0.0, 10.0, 10.0], 0))
            .collect()
    }

    fn tag(label: &str, line_index: usize) -> LocationTag {
        LocationTag {
            label: label.to_string(),
            line_index,
        }
    }

    #[test]
    fn test_default_phrases() {
        let extractor = LocationExtractor::new(&ExtractionConfig::default().locations);
        let doc = lines(&[
            "Consegna: UFFICIO \"A\"",
            "123.456.789",
            "Sala Riunioni H - piano 2",
            "Ufficio C/D",
        ]);
        assert_eq!(
            extractor.extract_all(&doc),
            vec![tag("-UFF.A", 0), tag("-S.R.H", 2), tag("-UFF.C/D", 3)]
        );
    }

    #[test]
    fn test_multiple_phrases_on_one_line() {
        let extractor = LocationExtractor::new(&ExtractionConfig::default().locations);
        let doc = lines(&["ufficio b e ufficio a"]);
        assert_eq!(
            extractor.extract_all(&doc),
            vec![tag("-UFF.A", 0), tag("-UFF.B", 0)]
        );
    }

    #[test]
    fn test_configured_phrase_is_lowercased() {
        let extractor = LocationExtractor::new(&[LocationRule::new("Magazzino", "-MAG")]);
        assert_eq!(extractor.extract_all(&lines(&["MAGAZZINO NORD"])), vec![tag("-MAG", 0)]);
    }

    #[test]
    fn test_no_rules() {
        let extractor = LocationExtractor::new(&[]);
        assert!(extractor.extract_all(&lines(&["ufficio a"])).is_empty());
    }
}
