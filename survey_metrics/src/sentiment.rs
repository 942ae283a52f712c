use log::debug;

use crate::config::*;

impl SentimentLexicon {
    /// Lowercases the text and removes every occurrence of every stopword.
    pub fn strip_stopwords(&self, text: &str) -> String {
        let mut res = text.to_lowercase();
        for word in self.stopwords.iter() {
            res = res.replace(word.as_str(), "");
        }
        res
    }

    /// Assigns a label to a comment.
    ///
    /// The rules are tried in order on the stripped comment. The first rule with
    /// a keyword contained in the comment decides the label.
    pub fn classify(&self, comment: &str) -> SentimentLabel {
        let stripped = self.strip_stopwords(comment);
        let label = self
            .rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| stripped.contains(k.as_str())))
            .map(|rule| rule.label)
            .unwrap_or(SentimentLabel::Neutral);
        debug!("classify: {:?} -> {:?}", comment, label);
        label
    }
}

/// Counts the labels of some comments.
///
/// Missing comments must be removed beforehand (see [Dataset::comments]).
pub fn tally<'a, I>(lexicon: &SentimentLexicon, comments: I) -> SentimentTally
where
    I: IntoIterator<Item = &'a str>,
{
    let mut res = SentimentTally::default();
    for c in comments {
        res.add(lexicon.classify(c));
    }
    res
}

/// The label of every comment, in input order.
pub fn label_comments<'a, I>(lexicon: &SentimentLexicon, comments: I) -> Vec<LabeledComment>
where
    I: IntoIterator<Item = &'a str>,
{
    comments
        .into_iter()
        .map(|c| LabeledComment {
            comment: c.to_string(),
            label: lexicon.classify(c),
        })
        .collect()
}

/// All the comments without their stopwords, joined by a space.
///
/// This is the text given to a word cloud generator.
pub fn wordcloud_corpus<'a, I>(lexicon: &SentimentLexicon, comments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    comments
        .into_iter()
        .map(|c| lexicon.strip_stopwords(c))
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn words(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_lexicon_simple() {
        init();
        let lex = SentimentLexicon::default();
        assert_eq!(lex.classify("좋았어요"), SentimentLabel::Positive);
        assert_eq!(lex.classify("별로예요"), SentimentLabel::Negative);
        assert_eq!(lex.classify("보통이에요"), SentimentLabel::Neutral);
    }

    #[test]
    fn empty_comments_are_neutral() {
        init();
        let lex = SentimentLexicon::default();
        assert_eq!(lex.classify(""), SentimentLabel::Neutral);
        assert_eq!(lex.classify("   \t"), SentimentLabel::Neutral);
    }

    #[test]
    fn positive_wins_over_negative() {
        init();
        let lex = SentimentLexicon::default();
        assert_eq!(
            lex.classify("대기가 길었지만 직원분이 친절해서 만족"),
            SentimentLabel::Positive
        );
        assert_eq!(lex.classify("계산이 느리다"), SentimentLabel::Negative);
    }

    #[test]
    fn classify_is_deterministic() {
        let lex = SentimentLexicon::default();
        let c = "매장이 너무 혼잡해서 불편했어요";
        let first = lex.classify(c);
        for _ in 0..5 {
            assert_eq!(lex.classify(c), first);
        }
        assert_eq!(first, SentimentLabel::Negative);
    }

    #[test]
    fn stopwords_are_removed_before_matching() {
        // "최고" only appears once the stopword is removed.
        let lex = SentimentLexicon::from_lists(
            &words(&["xx"]),
            &words(&["최고"]),
            &words(&["별로"]),
            &[],
        );
        assert_eq!(lex.classify("최xx고"), SentimentLabel::Positive);
        assert_eq!(lex.strip_stopwords("최xx고xx"), "최고");
    }

    #[test]
    fn stopword_can_hide_keyword() {
        let lex = SentimentLexicon::from_lists(&words(&["좋았"]), &words(&["좋았"]), &[], &[]);
        assert_eq!(lex.classify("좋았어요"), SentimentLabel::Neutral);
    }

    #[test]
    fn matching_ignores_case() {
        let lex = SentimentLexicon::from_lists(&[], &words(&["Great"]), &words(&["bad"]), &[]);
        assert_eq!(lex.classify("GREAT staff"), SentimentLabel::Positive);
        assert_eq!(lex.classify("Bad parking"), SentimentLabel::Negative);
        assert_eq!(lex.classify("ok"), SentimentLabel::Neutral);
    }

    #[test]
    fn rules_apply_in_order() {
        // Putting the negative rule first flips the precedence.
        let lex = SentimentLexicon::new(
            &[],
            &[
                KeywordRule {
                    label: SentimentLabel::Negative,
                    keywords: words(&["bad"]),
                },
                KeywordRule {
                    label: SentimentLabel::Positive,
                    keywords: words(&["good"]),
                },
            ],
        );
        assert_eq!(lex.classify("good and bad"), SentimentLabel::Negative);
    }

    #[test]
    fn tally_reports_all_labels() {
        init();
        let lex = SentimentLexicon::default();
        let t = tally(&lex, ["좋았어요", "별로예요", "보통이에요"]);
        assert_eq!(
            t,
            SentimentTally {
                positive: 1,
                negative: 1,
                neutral: 1
            }
        );

        let t = tally(&lex, ["좋았어요", "좋았어요"]);
        assert_eq!(
            t.entries(),
            [
                (SentimentLabel::Positive, 2),
                (SentimentLabel::Negative, 0),
                (SentimentLabel::Neutral, 0)
            ]
        );
        assert_eq!(t.share(SentimentLabel::Positive), 100.0);
    }

    #[test]
    fn tally_empty() {
        let lex = SentimentLexicon::default();
        let t = tally(&lex, Vec::<&str>::new());
        assert_eq!(t.total(), 0);
        assert_eq!(t.share(SentimentLabel::Neutral), 0.0);
    }

    #[test]
    fn label_comments_keeps_order() {
        let lex = SentimentLexicon::default();
        let labelled = label_comments(&lex, ["별로예요", "좋았어요"]);
        assert_eq!(labelled.len(), 2);
        assert_eq!(labelled[0].comment, "별로예요");
        assert_eq!(labelled[0].label, SentimentLabel::Negative);
        assert_eq!(labelled[1].label, SentimentLabel::Positive);
    }

    #[test]
    fn corpus_strips_stopwords() {
        let lex = SentimentLexicon::from_lists(&words(&["너무"]), &[], &[], &[]);
        assert_eq!(
            wordcloud_corpus(&lex, ["너무 좋아요", "너무너무 편해요"]),
            " 좋아요  편해요"
        );
    }
}
