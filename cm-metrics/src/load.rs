//! Reading a results directory back into records
//!
//! Every loader fails with [`MetricsError::MissingFile`] when its file is
//! absent and with [`MetricsError::MalformedField`] or
//! [`MetricsError::MalformedCsv`] when the content does not parse.

use crate::aggregate::HypothesisReport;
use crate::error::MetricsError;
use crate::records::{
    ResultsDocument, SummaryRow, SummaryTable, TrajectoryTable, HYPOTHESIS_FILE, RESULTS_FILE,
    SUMMARY_FILE, TRAJECTORIES_FILE,
};
use crate::validate;
use calibrateme_core::{ProfileId, SchedulerType};
use std::path::Path;
use std::str::FromStr;

fn read(path: &Path) -> Result<String, MetricsError> {
    if !path.is_file() {
        return Err(MetricsError::MissingFile(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Split one CSV line, honouring double-quoted fields with `""` escapes
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Non-empty lines with their 1-based line numbers
fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty())
}

fn parse_field<T: FromStr>(field: &str, line: usize, value: &str) -> Result<T, MetricsError> {
    value.trim().parse().map_err(|_| MetricsError::MalformedField {
        field: field.to_string(),
        line,
        value: value.to_string(),
    })
}

/// Column positions of a header, looked up by name
struct Header {
    names: Vec<String>,
}

impl Header {
    fn index(&self, name: &str) -> Result<usize, MetricsError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| MetricsError::MalformedCsv(format!("missing column `{name}`")))
    }
}

/// Load `tuned_summary.csv`
pub fn load_summary(path: impl AsRef<Path>) -> Result<SummaryTable, MetricsError> {
    let path = path.as_ref();
    let content = read(path)?;
    let mut lines = numbered_lines(&content);
    let (_, header_line) = lines
        .next()
        .ok_or_else(|| MetricsError::MalformedCsv(format!("{} is empty", path.display())))?;
    let header = Header {
        names: split_csv_line(header_line),
    };

    let columns = [
        "profile",
        "scheduler",
        "ret_1d",
        "ret_7d",
        "ret_30d",
        "mastery",
        "efficiency",
        "final_ece",
        "final_brier",
        "final_Kstar",
    ];
    let idx = columns
        .iter()
        .map(|c| header.index(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let fields = split_csv_line(line);
        if fields.len() != header.names.len() {
            return Err(MetricsError::MalformedCsv(format!(
                "line {line_no} has {} fields, header has {}",
                fields.len(),
                header.names.len()
            )));
        }
        let num = |i: usize| parse_field::<f64>(columns[i], line_no, &fields[idx[i]]);
        rows.push(SummaryRow {
            profile: parse_field::<ProfileId>("profile", line_no, &fields[idx[0]])?,
            scheduler: parse_field::<SchedulerType>("scheduler", line_no, &fields[idx[1]])?,
            ret_1d: num(2)?,
            ret_7d: num(3)?,
            ret_30d: num(4)?,
            mastery: num(5)?,
            efficiency: num(6)?,
            final_ece: num(7)?,
            final_brier: num(8)?,
            final_kstar: num(9)?,
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded summary");
    Ok(SummaryTable::new(rows))
}

/// Load `tuned_results.json`
pub fn load_results(path: impl AsRef<Path>) -> Result<ResultsDocument, MetricsError> {
    let path = path.as_ref();
    let document: ResultsDocument = serde_json::from_str(&read(path)?)?;
    tracing::debug!(path = %path.display(), records = document.len(), "loaded results document");
    Ok(document)
}

/// Load `tuned_trajectories.csv`
pub fn load_trajectories(path: impl AsRef<Path>) -> Result<TrajectoryTable, MetricsError> {
    let path = path.as_ref();
    let content = read(path)?;
    let mut lines = numbered_lines(&content);
    let (_, header_line) = lines
        .next()
        .ok_or_else(|| MetricsError::MalformedCsv(format!("{} is empty", path.display())))?;
    let names = split_csv_line(header_line);
    if names.first().map(String::as_str) != Some("session") {
        return Err(MetricsError::MalformedCsv(
            "first trajectory column must be `session`".to_string(),
        ));
    }

    let mut sessions = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len() - 1];
    for (line_no, line) in lines {
        let fields = split_csv_line(line);
        if fields.len() != names.len() {
            return Err(MetricsError::MalformedCsv(format!(
                "line {line_no} has {} fields, header has {}",
                fields.len(),
                names.len()
            )));
        }
        sessions.push(parse_field::<u32>("session", line_no, &fields[0])?);
        for (col, field) in fields[1..].iter().enumerate() {
            values[col].push(parse_field::<f64>(&names[col + 1], line_no, field)?);
        }
    }

    let columns = names.into_iter().skip(1).zip(values).collect();
    Ok(TrajectoryTable::new(sessions, columns))
}

/// Load `hypothesis.json`
pub fn load_hypothesis(path: impl AsRef<Path>) -> Result<HypothesisReport, MetricsError> {
    Ok(serde_json::from_str(&read(path.as_ref())?)?)
}

/// Everything the report layer reads from a results directory
///
/// The summary and the results document are required; the trajectory table
/// and the hypothesis report are picked up when present.
#[derive(Debug, Clone)]
pub struct ResultsDataset {
    pub summary: SummaryTable,
    pub document: ResultsDocument,
    pub trajectories: Option<TrajectoryTable>,
    pub hypothesis: Option<HypothesisReport>,
}

impl ResultsDataset {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, MetricsError> {
        let dir = dir.as_ref();
        let summary = load_summary(dir.join(SUMMARY_FILE))?;
        let document = load_results(dir.join(RESULTS_FILE))?;

        let trajectories_path = dir.join(TRAJECTORIES_FILE);
        let trajectories = if trajectories_path.is_file() {
            Some(load_trajectories(trajectories_path)?)
        } else {
            tracing::debug!(dir = %dir.display(), "no trajectory table");
            None
        };
        let hypothesis_path = dir.join(HYPOTHESIS_FILE);
        let hypothesis = if hypothesis_path.is_file() {
            Some(load_hypothesis(hypothesis_path)?)
        } else {
            None
        };

        tracing::info!(
            dir = %dir.display(),
            rows = summary.len(),
            records = document.len(),
            "loaded results"
        );
        Ok(Self {
            summary,
            document,
            trajectories,
            hypothesis,
        })
    }

    /// Check every data-contract property
    ///
    /// # Arguments
    /// * `expected_sessions` - Required trajectory length; inferred from the
    ///   first key-profile record when `None`
    pub fn validate(&self, expected_sessions: Option<usize>) -> Result<usize, MetricsError> {
        validate::validate_dataset(self, expected_sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_quotes() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv_line("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(split_csv_line("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
        assert_eq!(split_csv_line("a,,"), vec!["a", "", ""]);
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("cm_load_definitely_missing.csv");
        match load_summary(&path) {
            Err(MetricsError::MissingFile(p)) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_number_names_field_and_line() {
        let path = std::env::temp_dir().join(format!("cm_load_bad_{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "profile,scheduler,ret_1d,ret_7d,ret_30d,mastery,efficiency,final_ece,final_brier,final_Kstar\n\
             Med-Over,SM2,0.5,abc,0.3,30.00,12.0000,0.1,0.2,0.5\n",
        )
        .unwrap();
        match load_summary(&path) {
            Err(MetricsError::MalformedField { field, line, value }) => {
                assert_eq!(field, "ret_7d");
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unknown_profile_is_malformed() {
        let path = std::env::temp_dir().join(format!("cm_load_profile_{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "profile,scheduler,ret_1d,ret_7d,ret_30d,mastery,efficiency,final_ece,final_brier,final_Kstar\n\
             Mid-Over,SM2,0.5,0.4,0.3,30.00,12.0000,0.1,0.2,0.5\n",
        )
        .unwrap();
        assert!(matches!(
            load_summary(&path),
            Err(MetricsError::MalformedField { ref field, .. }) if field == "profile"
        ));
        std::fs::remove_file(path).ok();
    }

    proptest::proptest! {
        #[test]
        fn split_recovers_escaped_fields(fields in proptest::collection::vec("[a-zA-Z0-9 ,\"._-]{0,12}", 1..8)) {
            let line = fields
                .iter()
                .map(|f| crate::export::csv::escape_csv(f))
                .collect::<Vec<_>>()
                .join(",");
            proptest::prop_assert_eq!(split_csv_line(&line), fields);
        }
    }
}
