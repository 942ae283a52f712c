pub use crate::config::*;

/// A builder for assembling a dataset row by row.
///
/// The ratings are checked against the 1..=7 scale as they are added.
///
/// ```
/// pub use survey_metrics::builder::Builder;
/// pub use survey_metrics::DatasetSchema;
/// # use survey_metrics::MetricsError;
///
/// let mut builder = Builder::new(&DatasetSchema::offline());
///
/// builder.add_row_simple(
///     "명동점",
///     "2024-09-02 10:00:00",
///     &[7.0, 6.0, 7.0, 5.0, 6.0],
///     "예.",
///     Some("직원분들이 친절해서 좋았어요"),
/// )?;
///
/// let dataset = builder.build();
/// assert_eq!(dataset.len(), 1);
/// # Ok::<(), MetricsError>(())
/// ```
pub struct Builder {
    pub(crate) _schema: DatasetSchema,
    pub(crate) _rows: Vec<SurveyRow>,
}

impl Builder {
    pub fn new(schema: &DatasetSchema) -> Builder {
        Builder {
            _schema: schema.clone(),
            _rows: Vec::new(),
        }
    }

    /// Adds a fully answered row.
    pub fn add_row_simple(
        &mut self,
        entity: &str,
        started_at: &str,
        ratings: &[f64],
        revisit: &str,
        comment: Option<&str>,
    ) -> Result<(), MetricsError> {
        let ratings: Vec<Option<f64>> = ratings.iter().map(|r| Some(*r)).collect();
        self.add_row(entity, started_at, &ratings, revisit, comment)
    }

    /// Adds a row in which some of the ratings may be missing.
    pub fn add_row(
        &mut self,
        entity: &str,
        started_at: &str,
        ratings: &[Option<f64>],
        revisit: &str,
        comment: Option<&str>,
    ) -> Result<(), MetricsError> {
        let ratings: [Option<f64>; NUM_DIMENSIONS] =
            ratings
                .try_into()
                .map_err(|_| MetricsError::WrongRatingCount {
                    expected: NUM_DIMENSIONS,
                    found: ratings.len(),
                })?;
        self.add_row_2(SurveyRow {
            entity: entity.to_string(),
            started_at: started_at.to_string(),
            ratings,
            revisit: revisit.to_string(),
            comment: comment.map(|s| s.to_string()),
        })
    }

    pub fn add_row_2(&mut self, row: SurveyRow) -> Result<(), MetricsError> {
        for value in row.ratings.iter().flatten() {
            if !(RATING_MIN..=RATING_MAX).contains(value) {
                return Err(MetricsError::RatingOutOfRange { value: *value });
            }
        }
        self._rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self._rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self._rows.is_empty()
    }

    pub fn build(self) -> Dataset {
        Dataset {
            schema: self._schema,
            rows: self._rows,
        }
    }
}
