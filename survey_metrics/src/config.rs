// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// Every survey asks exactly five rating questions.
pub const NUM_DIMENSIONS: usize = 5;

/// The ratings are given on a 1..=7 scale.
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 7.0;

/// One respondent.
///
/// Rating values may be missing when the respondent skipped a question.
/// A missing comment is `None`, never an empty string placeholder.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyRow {
    pub entity: String,
    pub started_at: String,
    pub ratings: [Option<f64>; NUM_DIMENSIONS],
    pub revisit: String,
    pub comment: Option<String>,
}

/// The column layout of a dataset.
///
/// The dimension columns are ordered: the n-th rating of a [SurveyRow]
/// belongs to the n-th dimension column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DatasetSchema {
    /// The column holding the store name. When absent, every row belongs
    /// to `implicit_entity`.
    pub entity_column: Option<String>,
    pub timestamp_column: String,
    pub dimension_columns: [String; NUM_DIMENSIONS],
    pub revisit_column: String,
    pub comment_column: Option<String>,
    pub implicit_entity: String,
}

impl DatasetSchema {
    /// The in-store survey export.
    pub fn offline() -> DatasetSchema {
        DatasetSchema {
            entity_column: Some("점포".to_string()),
            timestamp_column: "시작일시".to_string(),
            dimension_columns: [
                "직원 서비스".to_string(),
                "정보 제공".to_string(),
                "상품 준비".to_string(),
                "신속 결제".to_string(),
                "매장 환경".to_string(),
            ],
            revisit_column: "재이용의향률".to_string(),
            comment_column: Some("추가 의견".to_string()),
            implicit_entity: "오프라인".to_string(),
        }
    }

    /// The online survey export. There is no store column.
    pub fn online() -> DatasetSchema {
        DatasetSchema {
            entity_column: None,
            timestamp_column: "시작일시".to_string(),
            dimension_columns: [
                "로그인 접속".to_string(),
                "상품 검색".to_string(),
                "상품 준비".to_string(),
                "상품 결제".to_string(),
                "앱 사용성".to_string(),
            ],
            revisit_column: "재이용의향률".to_string(),
            comment_column: Some("추가 의견".to_string()),
            implicit_entity: "온라인".to_string(),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    pub schema: DatasetSchema,
    pub rows: Vec<SurveyRow>,
}

impl Dataset {
    pub fn new(schema: &DatasetSchema) -> Dataset {
        Dataset {
            schema: schema.clone(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The comments that were actually written. Missing comments are skipped.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|r| r.comment.as_deref())
    }

    pub(crate) fn retain_rows<F>(&self, keep: F) -> Dataset
    where
        F: Fn(&SurveyRow) -> bool,
    {
        Dataset {
            schema: self.schema.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

// ******** Output data structures *********

/// The scores of one entity, on the 0..=100 scale.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoreRow {
    /// (dimension name, score), in schema order.
    pub dimensions: Vec<(String, u32)>,
    /// The overall satisfaction.
    pub composite: u32,
}

impl ScoreRow {
    pub fn dimension(&self, name: &str) -> Option<u32> {
        self.dimensions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }
}

/// Scores per entity, sorted by entity name.
///
/// Entities without rows are not present: lookups return `None` and the
/// caller decides on the fallback.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ScoreTable {
    pub rows: BTreeMap<String, ScoreRow>,
}

impl ScoreTable {
    pub fn get(&self, entity: &str) -> Option<&ScoreRow> {
        self.rows.get(entity)
    }

    pub fn composite(&self, entity: &str) -> Option<u32> {
        self.rows.get(entity).map(|r| r.composite)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// For each dimension, the mean of the entities' scores.
    ///
    /// The values are not rounded. Returns nothing if the table is empty.
    pub fn dimension_means(&self) -> Vec<(String, f64)> {
        let first = match self.rows.values().next() {
            Some(r) => r,
            None => return Vec::new(),
        };
        let num_entities = self.rows.len() as f64;
        first
            .dimensions
            .iter()
            .enumerate()
            .map(|(idx, (name, _))| {
                let total: u32 = self.rows.values().map(|r| r.dimensions[idx].1).sum();
                (name.clone(), total as f64 / num_entities)
            })
            .collect()
    }
}

/// Revisit-intention percentages per entity, sorted by entity name.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RevisitTable {
    pub rates: BTreeMap<String, u32>,
}

impl RevisitTable {
    pub fn get(&self, entity: &str) -> Option<u32> {
        self.rates.get(entity).cloned()
    }

    /// An entity without any respondent has a rate of zero.
    pub fn rate_or_zero(&self, entity: &str) -> u32 {
        self.get(entity).unwrap_or(0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of comments per label. All the labels are always reported.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct SentimentTally {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl SentimentTally {
    pub fn get(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }

    /// The share of a label, in percent. Zero when there are no comments.
    pub fn share(&self, label: SentimentLabel) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            100.0 * self.get(label) as f64 / total as f64
        }
    }

    pub fn entries(&self) -> [(SentimentLabel, u64); 3] {
        SentimentLabel::ALL.map(|l| (l, self.get(l)))
    }

    pub(crate) fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabeledComment {
    pub comment: String,
    pub label: SentimentLabel,
}

/// Errors raised when assembling a dataset.
#[derive(PartialEq, Debug, Clone)]
pub enum MetricsError {
    /// A row did not provide one rating per dimension.
    WrongRatingCount { expected: usize, found: usize },
    /// A rating outside of the 1..=7 scale (or not a number).
    RatingOutOfRange { value: f64 },
}

impl Error for MetricsError {}

impl Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::WrongRatingCount { expected, found } => {
                write!(f, "expected {} ratings, found {}", expected, found)
            }
            MetricsError::RatingOutOfRange { value } => {
                write!(
                    f,
                    "rating {} is outside of the {}..={} scale",
                    value, RATING_MIN, RATING_MAX
                )
            }
        }
    }
}

// ********* Configuration **********

/// Words that carry no sentiment. They are removed before matching.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "너무", "정말", "진짜", "그냥", "매우", "아주", "조금", "약간", "좀", "다소", "또한", "대체로",
    "때문에", "이", "저", "그", "그리고", "하지만", "그래서", "또", "보다", "더", "그런", "같은",
    "사실", "이건", "그건", "저건", "정도", "한", "이런", "저런", "게다가", "결국", "결과적으로",
    "많", "합니다", "은ㅋ",
];

pub const DEFAULT_POSITIVE_KEYWORDS: &[&str] = &[
    "만족", "훌륭", "배려", "기분", "세심", "프로페셔널", "도움", "최고", "좋다", "좋았", "청결",
    "쾌적", "깔끔", "정돈", "깨끗", "넓다", "안락", "편안", "환영", "유쾌", "행복", "기쁘다",
    "정성", "편리", "완벽", "신선", "즐겁다", "저렴", "추천", "구성", "효율적", "다음에도", "ㅎㅎ",
    "감사",
];

pub const DEFAULT_NEGATIVE_KEYWORDS: &[&str] = &[
    "불만", "느리다", "대기", "오래", "혼잡", "지저분", "불편", "부족", "문제", "싫다", "나쁘다",
    "늦다", "미흡", "아쉽다", "불친절", "지루", "비싸다", "고장", "어렵다", "복잡", "바쁘다",
    "모자라다", "거칠다", "못함", "어수선", "좁다", "복잡하다", "힘들다", "불쾌", "답답", "엉망",
    "구성부족", "실망", "ㅠ", "귀찮", "불", "최악", "비싸요", "안됨", "아쉬", "없음", "별로",
];

pub const DEFAULT_NEUTRAL_KEYWORDS: &[&str] = &[
    "보통", "무난", "괜찮다", "평범", "중립", "기대", "그럭저럭", "적당", "그저", "아무렇지",
    "괜찮", "알맞다", "중간", "평균", "일반", "기본", "차별",
];

/// A classification rule: a comment containing any of the keywords gets the label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct KeywordRule {
    pub label: SentimentLabel,
    pub keywords: Vec<String>,
}

/// The stopwords and the ordered list of rules used by the classifier.
///
/// The rules are evaluated in order and the first match wins. A comment that
/// matches no rule is neutral.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SentimentLexicon {
    pub(crate) stopwords: Vec<String>,
    pub(crate) rules: Vec<KeywordRule>,
}

impl SentimentLexicon {
    /// All the words are lowercased so that matching ignores case.
    pub fn new(stopwords: &[String], rules: &[KeywordRule]) -> SentimentLexicon {
        SentimentLexicon {
            stopwords: stopwords
                .iter()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            rules: rules
                .iter()
                .map(|r| KeywordRule {
                    label: r.label,
                    keywords: r
                        .keywords
                        .iter()
                        .map(|s| s.to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect(),
                })
                .collect(),
        }
    }

    /// Builds the usual priority chain: positive, then negative, then neutral.
    pub fn from_lists(
        stopwords: &[String],
        positive: &[String],
        negative: &[String],
        neutral: &[String],
    ) -> SentimentLexicon {
        let rules = [
            (SentimentLabel::Positive, positive),
            (SentimentLabel::Negative, negative),
            (SentimentLabel::Neutral, neutral),
        ]
        .map(|(label, words)| KeywordRule {
            label,
            keywords: words.to_vec(),
        });
        SentimentLexicon::new(stopwords, &rules)
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        let owned = |l: &[&str]| -> Vec<String> { l.iter().map(|s| s.to_string()).collect() };
        SentimentLexicon::from_lists(
            &owned(DEFAULT_STOPWORDS),
            &owned(DEFAULT_POSITIVE_KEYWORDS),
            &owned(DEFAULT_NEGATIVE_KEYWORDS),
            &owned(DEFAULT_NEUTRAL_KEYWORDS),
        )
    }
}
