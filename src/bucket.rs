//! Confidence buckets and the human-readable label derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::ClassificationResult;

/// Lower bounds (exclusive) of the two reported confidence tiers.
///
/// Scores are compared as percentages in `f64`, so an `f32` score of `0.6`
/// (stored as 0.60000002) clears a `0.60` bound while `0.7` (0.69999999)
/// does not clear `0.70`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketThresholds {
    pub very_high: f64,
    pub high: f64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            very_high: 0.70,
            high: 0.60,
        }
    }
}

/// Departments split by confidence, each list in score order.
/// A department appears in at most one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBuckets {
    pub very_high: Vec<String>,
    pub high: Vec<String>,
}

impl ConfidenceBuckets {
    pub fn is_empty(&self) -> bool {
        self.very_high.is_empty() && self.high.is_empty()
    }
}

/// Place each scored department into the highest tier its score clears.
/// Departments at or below `thresholds.high` are dropped.
pub fn bucket(result: &ClassificationResult, thresholds: BucketThresholds) -> ConfidenceBuckets {
    let very_high = thresholds.very_high * 100.0;
    let high = thresholds.high * 100.0;
    let mut buckets = ConfidenceBuckets::default();
    for scored in result.scores() {
        let percent = f64::from(scored.score) * 100.0;
        if percent > very_high {
            buckets.very_high.push(scored.department.clone());
        } else if percent > high {
            buckets.high.push(scored.department.clone());
        }
    }
    buckets
}

/// Language of the rendered label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocale {
    #[default]
    Vi,
    En,
}

/// Which tier a label reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    VeryHigh,
    High,
    None,
}

/// One-line summary of a classification.
///
/// Only the best non-empty tier is reported: very high wins over high, and
/// with neither the label says no department matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceLabel {
    pub tier: ConfidenceTier,
    pub departments: Vec<String>,
}

impl ConfidenceLabel {
    pub fn from_buckets(buckets: &ConfidenceBuckets) -> Self {
        let (tier, departments) = if !buckets.very_high.is_empty() {
            (ConfidenceTier::VeryHigh, &buckets.very_high)
        } else if !buckets.high.is_empty() {
            (ConfidenceTier::High, &buckets.high)
        } else {
            return Self {
                tier: ConfidenceTier::None,
                departments: Vec::new(),
            };
        };
        Self {
            tier,
            departments: departments.iter().map(|d| d.to_uppercase()).collect(),
        }
    }

    pub fn render(&self, locale: LabelLocale) -> String {
        let names = self.departments.join(", ");
        match (self.tier, locale) {
            (ConfidenceTier::VeryHigh, LabelLocale::Vi) => format!("Rất cao: {names}"),
            (ConfidenceTier::High, LabelLocale::Vi) => format!("Cao: {names}"),
            (ConfidenceTier::None, LabelLocale::Vi) => {
                "Đoạn văn không thuộc phòng ban nào".to_string()
            }
            (ConfidenceTier::VeryHigh, LabelLocale::En) => format!("Very high: {names}"),
            (ConfidenceTier::High, LabelLocale::En) => format!("High: {names}"),
            (ConfidenceTier::None, LabelLocale::En) => "No department matched".to_string(),
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(LabelLocale::Vi))
    }
}

/// Bucket `result` and render the label in one step.
pub fn label_for(
    result: &ClassificationResult,
    thresholds: BucketThresholds,
    locale: LabelLocale,
) -> String {
    ConfidenceLabel::from_buckets(&bucket(result, thresholds)).render(locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DepartmentScore;

    fn result(scores: &[(&str, f32)]) -> ClassificationResult {
        ClassificationResult::from_scores(
            scores
                .iter()
                .map(|(d, s)| DepartmentScore {
                    department: d.to_string(),
                    score: *s,
                })
                .collect(),
        )
    }

    #[test]
    fn tiers_partition_scores() {
        let r = result(&[("a", 0.95), ("b", 0.71), ("c", 0.65), ("d", 0.59), ("e", 0.40)]);
        let buckets = bucket(&r, BucketThresholds::default());
        assert_eq!(buckets.very_high, ["a", "b"]);
        assert_eq!(buckets.high, ["c"]);
    }

    #[test]
    fn boundary_scores_fall_to_lower_tier() {
        let r = result(&[("a", 0.70)]);
        let buckets = bucket(&r, BucketThresholds::default());
        assert!(buckets.very_high.is_empty());
        assert_eq!(buckets.high, ["a"]);
    }

    #[test]
    fn f32_sixty_percent_counts_as_high() {
        // 0.6f32 widens to 0.6000000238, i.e. 60.0000024%.
        let r = result(&[("a", 0.60)]);
        let buckets = bucket(&r, BucketThresholds::default());
        assert!(buckets.very_high.is_empty());
        assert_eq!(buckets.high, ["a"]);

        let just_below = result(&[("a", 0.599_999_9)]);
        assert!(bucket(&just_below, BucketThresholds::default()).is_empty());
    }

    #[test]
    fn very_high_label_wins() {
        let r = result(&[("phòng đào tạo", 0.81), ("phòng công tác sinh viên", 0.75), ("x", 0.65)]);
        assert_eq!(
            label_for(&r, BucketThresholds::default(), LabelLocale::Vi),
            "Rất cao: PHÒNG ĐÀO TẠO, PHÒNG CÔNG TÁC SINH VIÊN"
        );
    }

    #[test]
    fn high_label_when_nothing_very_high() {
        let r = result(&[("phòng truyền thông", 0.65)]);
        assert_eq!(
            label_for(&r, BucketThresholds::default(), LabelLocale::Vi),
            "Cao: PHÒNG TRUYỀN THÔNG"
        );
        assert_eq!(
            label_for(&r, BucketThresholds::default(), LabelLocale::En),
            "High: PHÒNG TRUYỀN THÔNG"
        );
    }

    #[test]
    fn no_match_label() {
        let r = result(&[("a", 0.45)]);
        let label = ConfidenceLabel::from_buckets(&bucket(&r, BucketThresholds::default()));
        assert_eq!(label.tier, ConfidenceTier::None);
        assert_eq!(label.to_string(), "Đoạn văn không thuộc phòng ban nào");
        assert_eq!(label.render(LabelLocale::En), "No department matched");
    }

    #[test]
    fn locale_parses_lowercase() {
        let locale: LabelLocale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(locale, LabelLocale::En);
    }
}
