/*!

This is the long-form manual for `survey_metrics` and `survey-report`.

## Input formats

Two survey exports are read, one row per respondent:

* the **offline** export, with one row per in-store respondent and a store column
* the **online** export, with no store column: every row belongs to the online channel

The following providers are supported:
* `csv` Comma Separated Values, with a header row
* `xlsx` Excel workbook, read directly (no conversion to CSV is needed)

### `csv`

The first row must contain the column names. The order of the columns is not significant.

```text
점포,시작일시,직원 서비스,정보 제공,상품 준비,신속 결제,매장 환경,재이용의향률,추가 의견
명동점,2024-09-02 10:12:00,7,6,7,6,7,예.,직원분들이 친절해서 좋았어요
부산점,2024-09-03 14:40:00,5,5,4,3,5,아니오.,
```

A rating cell may be empty: the respondent is then ignored for this question only.
An empty comment cell is a missing comment and is not classified.

### `xlsx`

The first row of the worksheet must contain the column names. Unless a name is
given with `excelWorksheetName`, the first worksheet of the workbook is read. Date cells are converted to
`YYYY-MM-DD HH:MM:SS`.

## Scores

For each store, every question is averaged over the respondents of the store,
and the average is converted from the 1..=7 scale to the 0..=100 scale
(`round(mean * 100 / 7)`). The overall satisfaction is the rounded average of
the five converted scores. Halves are rounded to the nearest even number.

A month is selected by looking for a token such as `2024-09` in the start
timestamp.

## Comments

Each comment gets one of three labels: `positive`, `negative` or `neutral`.
The stopwords are first removed from the lowercased comment. Then the rules are
tried in order: a comment containing one of the positive keywords is positive,
otherwise a comment containing one of the negative keywords is negative. All the
other comments are neutral.

## Configuration

`survey-report` accepts a configuration file in JSON. All the keys are optional
except `sources`.

```text
{
  "outputSettings": { "reportName": "9월 고객만족도", "outputPath": "report.json" },
  "sources": {
    "offline": { "provider": "csv", "filePath": "240809off.csv" },
    "online": { "provider": "xlsx", "filePath": "240809on.xlsx", "excelWorksheetName": "Sheet1" }
  },
  "period": { "currentMonth": "2024-09", "previousMonth": "2024-08" },
  "stores": ["명동점", "인천공항점", "부산점"],
  "affirmativeResponse": "예.",
  "lexicon": {
    "stopwords": ["너무", "정말"],
    "positiveKeywords": ["만족", "좋았"],
    "negativeKeywords": ["불만", "별로"],
    "neutralKeywords": ["보통"]
  }
}
```

Options for a source:
 - `provider` (string): `csv` or `xlsx`
 - `filePath` (string): relative paths are resolved against the directory of the configuration file
 - `excelWorksheetName` (string, optional): for Excel inputs, the name of the worksheet
 - `columns` (object, optional): overrides the column names. The keys are
   `entityColumn`, `timestampColumn`, `dimensionColumns` (exactly 5 names),
   `revisitColumn`, `commentColumn` and `implicitEntity`.

Options for the lexicon: each list replaces the corresponding built-in list.

 */
