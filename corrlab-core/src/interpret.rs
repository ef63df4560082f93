//! Natural-language interpretation of a correlation coefficient.
//!
//! Uses one four-band strength scheme:
//!
//! | band              | label      |
//! |-------------------|------------|
//! | `|r| >= 0.7`      | 매우 강한  |
//! | `0.5 <= |r| < 0.7`| 강한       |
//! | `0.3 <= |r| < 0.5`| 중간       |
//! | `|r| < 0.3`       | 약한       |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn from_coefficient(r: f64) -> Self {
        let abs = r.abs();
        if abs >= 0.7 {
            Strength::VeryStrong
        } else if abs >= 0.5 {
            Strength::Strong
        } else if abs >= 0.3 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strength::VeryStrong => "매우 강한",
            Strength::Strong => "강한",
            Strength::Moderate => "중간",
            Strength::Weak => "약한",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
    /// Exactly zero, including the degenerate-input convention.
    None,
}

impl Direction {
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.0 {
            Direction::Positive
        } else if r < 0.0 {
            Direction::Negative
        } else {
            Direction::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Positive => "양의",
            Direction::Negative => "음의",
            Direction::None => "",
        }
    }
}

const CAVEATS: [&str; 3] = [
    "상관관계는 인과관계를 의미하지 않습니다. 두 변수 간의 연관성만을 나타낼 뿐입니다.",
    "실제 의미 있는 관계인지는 추가적인 분석과 도메인 지식이 필요합니다.",
    "외부 요인이나 우연의 일치일 가능성도 고려해야 합니다.",
];

/// Rendered interpretation for display alongside the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub correlation: f64,
    pub strength: Strength,
    pub direction: Direction,
    pub summary: String,
    pub details: Vec<String>,
    pub caveats: Vec<String>,
}

impl Interpretation {
    pub fn new(r: f64, name1: &str, name2: &str) -> Self {
        let strength = Strength::from_coefficient(r);
        let direction = Direction::from_coefficient(r);

        let summary = match direction {
            Direction::None => {
                format!("{name1}와 {name2} 사이에는 선형 상관관계가 관찰되지 않습니다.")
            }
            _ => format!(
                "{name1}와 {name2} 사이에는 {} {} 상관관계가 있습니다.",
                direction.label(),
                strength.label()
            ),
        };

        let mut details = vec![format!(
            "상관계수가 {r:.3}이므로, 두 변수는 약 {:.1}% 정도의 선형 관계를 보입니다.",
            r.abs() * 100.0
        )];
        if direction != Direction::None {
            let tendency = if direction == Direction::Positive { "증가" } else { "감소" };
            details.push(format!(
                "{} 상관관계는 한 변수가 증가할 때 다른 변수가 {tendency}하는 경향이 있음을 의미합니다.",
                direction.label()
            ));
        }
        details.push(format!(
            "이 관계의 강도는 {} 수준으로 분류됩니다.",
            strength.label()
        ));

        Self {
            correlation: r,
            strength,
            direction,
            summary,
            details,
            caveats: CAVEATS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(Strength::from_coefficient(0.7), Strength::VeryStrong);
        assert_eq!(Strength::from_coefficient(-0.95), Strength::VeryStrong);
        assert_eq!(Strength::from_coefficient(0.69), Strength::Strong);
        assert_eq!(Strength::from_coefficient(-0.5), Strength::Strong);
        assert_eq!(Strength::from_coefficient(0.49), Strength::Moderate);
        assert_eq!(Strength::from_coefficient(0.3), Strength::Moderate);
        assert_eq!(Strength::from_coefficient(0.29), Strength::Weak);
        assert_eq!(Strength::from_coefficient(0.0), Strength::Weak);
    }

    #[test]
    fn direction_of_zero_is_none() {
        assert_eq!(Direction::from_coefficient(0.0), Direction::None);
        assert_eq!(Direction::from_coefficient(1e-12), Direction::Positive);
        assert_eq!(Direction::from_coefficient(-0.4), Direction::Negative);
    }

    #[test]
    fn positive_summary() {
        let interp = Interpretation::new(0.82, "서울 날씨", "KOSPI 지수");
        assert_eq!(
            interp.summary,
            "서울 날씨와 KOSPI 지수 사이에는 양의 매우 강한 상관관계가 있습니다."
        );
        assert_eq!(interp.details.len(), 3);
        assert!(interp.details[0].contains("0.820"));
        assert!(interp.details[0].contains("82.0%"));
        assert!(interp.details[1].contains("증가"));
        assert_eq!(interp.caveats.len(), 3);
    }

    #[test]
    fn negative_summary_mentions_decrease() {
        let interp = Interpretation::new(-0.41, "비트코인 가격", "코로나19 확진자");
        assert!(interp.summary.contains("음의 중간 상관관계"));
        assert!(interp.details[1].contains("감소"));
    }

    #[test]
    fn zero_has_no_direction_sentence() {
        let interp = Interpretation::new(0.0, "서울 날씨", "비트코인 가격");
        assert!(interp.summary.contains("관찰되지 않습니다"));
        assert_eq!(interp.details.len(), 2);
        assert_eq!(interp.strength, Strength::Weak);
    }
}
